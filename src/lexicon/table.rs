//! Static vocabulary data
//!
//! English COCO labels with their simplified Chinese text and tone-marked pinyin.

use super::TranslationEntry;

const fn entry(chinese: &'static str, pinyin: &'static str) -> TranslationEntry {
    TranslationEntry { chinese, pinyin }
}

/// Label vocabulary, keyed by lowercase English label
pub(super) const TRANSLATIONS: [(&str, TranslationEntry); 80] = [
    ("person", entry("人", "rén")),
    ("bicycle", entry("自行车", "zìxíngchē")),
    ("car", entry("汽车", "qìchē")),
    ("motorcycle", entry("摩托车", "mótuōchē")),
    ("airplane", entry("飞机", "fēijī")),
    ("bus", entry("公交车", "gōngjiāo chē")),
    ("train", entry("火车", "huǒchē")),
    ("truck", entry("卡车", "kǎchē")),
    ("boat", entry("船", "chuán")),
    ("traffic light", entry("红绿灯", "hónglǜdēng")),
    ("fire hydrant", entry("消防栓", "xiāofáng shuān")),
    ("stop sign", entry("停止标志", "tíngzhǐ biāozhì")),
    ("parking meter", entry("停车计时器", "tíngchē jìshíqì")),
    ("bench", entry("长椅", "chángyǐ")),
    ("bird", entry("鸟", "niǎo")),
    ("cat", entry("猫", "māo")),
    ("dog", entry("狗", "gǒu")),
    ("horse", entry("马", "mǎ")),
    ("sheep", entry("羊", "yáng")),
    ("cow", entry("牛", "niú")),
    ("elephant", entry("大象", "dàxiàng")),
    ("bear", entry("熊", "xióng")),
    ("zebra", entry("斑马", "bānmǎ")),
    ("giraffe", entry("长颈鹿", "chángjǐnglù")),
    ("backpack", entry("背包", "bēibāo")),
    ("umbrella", entry("雨伞", "yǔsǎn")),
    ("handbag", entry("手提包", "shǒutíbāo")),
    ("tie", entry("领带", "lǐngdài")),
    ("suitcase", entry("行李箱", "xínglǐxiāng")),
    ("frisbee", entry("飞盘", "fēipán")),
    ("skis", entry("滑雪板", "huáxuěbǎn")),
    ("snowboard", entry("单板滑雪", "dānbǎn huáxuě")),
    ("sports ball", entry("运动球", "yùndòng qiú")),
    ("kite", entry("风筝", "fēngzheng")),
    ("baseball bat", entry("棒球棒", "bàngqiú bàng")),
    ("baseball glove", entry("棒球手套", "bàngqiú shǒutào")),
    ("skateboard", entry("滑板", "huábǎn")),
    ("surfboard", entry("冲浪板", "chōnglàngbǎn")),
    ("tennis racket", entry("网球拍", "wǎngqiú pāi")),
    ("bottle", entry("瓶子", "píngzi")),
    ("wine glass", entry("酒杯", "jiǔbēi")),
    ("cup", entry("杯子", "bēizi")),
    ("fork", entry("叉子", "chāzi")),
    ("knife", entry("刀", "dāo")),
    ("spoon", entry("勺子", "sháozi")),
    ("bowl", entry("碗", "wǎn")),
    ("banana", entry("香蕉", "xiāngjiāo")),
    ("apple", entry("苹果", "píngguǒ")),
    ("sandwich", entry("三明治", "sānmíngzhì")),
    ("orange", entry("橙子", "chéngzi")),
    ("broccoli", entry("西兰花", "xīlánhuā")),
    ("carrot", entry("胡萝卜", "húluóbo")),
    ("hot dog", entry("热狗", "règǒu")),
    ("pizza", entry("披萨", "pīsà")),
    ("donut", entry("甜甜圈", "tiántiánquān")),
    ("cake", entry("蛋糕", "dàngāo")),
    ("chair", entry("椅子", "yǐzi")),
    ("couch", entry("沙发", "shāfā")),
    ("potted plant", entry("盆栽", "pénzāi")),
    ("bed", entry("床", "chuáng")),
    ("dining table", entry("餐桌", "cānzhuō")),
    ("toilet", entry("厕所", "cèsuǒ")),
    ("tv", entry("电视", "diànshì")),
    ("laptop", entry("笔记本电脑", "bǐjìběn diànnǎo")),
    ("mouse", entry("鼠标", "shǔbiāo")),
    ("remote", entry("遥控器", "yáokòngqì")),
    ("keyboard", entry("键盘", "jiànpán")),
    ("cell phone", entry("手机", "shǒujī")),
    ("microwave", entry("微波炉", "wēibōlú")),
    ("oven", entry("烤箱", "kǎoxiāng")),
    ("toaster", entry("烤面包机", "kǎo miànbāo jī")),
    ("sink", entry("水槽", "shuǐcáo")),
    ("refrigerator", entry("冰箱", "bīngxiāng")),
    ("book", entry("书", "shū")),
    ("clock", entry("时钟", "shízhōng")),
    ("vase", entry("花瓶", "huāpíng")),
    ("scissors", entry("剪刀", "jiǎndāo")),
    ("teddy bear", entry("泰迪熊", "tàidí xióng")),
    ("hair drier", entry("吹风机", "chuīfēngjī")),
    ("toothbrush", entry("牙刷", "yáshuā")),
];

/// Labels treated as people or animals
pub(super) const LIVING_LABELS: [&str; 11] = [
    "person", "bird", "cat", "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra",
    "giraffe",
];
