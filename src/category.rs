use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockCategory {
    Control,
    Data,
    Events,
    Looks,
    MoreBlocks,
    Motion,
    Operators,
    Pen,
    Sensing,
    Sound,
}

impl BlockCategory {
    pub const ALL: [BlockCategory; 10] = [
        BlockCategory::Control,
        BlockCategory::Data,
        BlockCategory::Events,
        BlockCategory::Looks,
        BlockCategory::MoreBlocks,
        BlockCategory::Motion,
        BlockCategory::Operators,
        BlockCategory::Pen,
        BlockCategory::Sensing,
        BlockCategory::Sound,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BlockCategory::Control => "control",
            BlockCategory::Data => "data",
            BlockCategory::Events => "events",
            BlockCategory::Looks => "looks",
            BlockCategory::MoreBlocks => "more blocks",
            BlockCategory::Motion => "motion",
            BlockCategory::Operators => "operators",
            BlockCategory::Pen => "pen",
            BlockCategory::Sensing => "sensing",
            BlockCategory::Sound => "sound",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "control" => Some(BlockCategory::Control),
            "data" => Some(BlockCategory::Data),
            "events" => Some(BlockCategory::Events),
            "looks" => Some(BlockCategory::Looks),
            "more blocks" | "more-blocks" => Some(BlockCategory::MoreBlocks),
            "motion" => Some(BlockCategory::Motion),
            "operators" => Some(BlockCategory::Operators),
            "pen" => Some(BlockCategory::Pen),
            "sensing" => Some(BlockCategory::Sensing),
            "sound" => Some(BlockCategory::Sound),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    counts: [usize; 10],
}

impl CategoryCounts {
    pub fn get(&self, category: BlockCategory) -> usize {
        self.counts[category.index()]
    }

    pub fn increment(&mut self, category: BlockCategory) {
        self.counts[category.index()] += 1;
    }

    pub fn add(&mut self, other: &CategoryCounts) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockCategory, usize)> + '_ {
        BlockCategory::ALL
            .iter()
            .map(move |category| (*category, self.get(*category)))
    }
}

pub trait BlockClassifier {
    fn classify(&self, block: &str) -> Option<BlockCategory>;
}

impl<F> BlockClassifier for F
where
    F: Fn(&str) -> Option<BlockCategory>,
{
    fn classify(&self, block: &str) -> Option<BlockCategory> {
        self(block)
    }
}

const MOTION: &[&str] = &[
    "forward:",
    "turnRight:",
    "turnLeft:",
    "heading:",
    "pointTowards:",
    "gotoX:y:",
    "gotoSpriteOrMouse:",
    "glideSecs:toX:y:elapsed:from:",
    "changeXposBy:",
    "xpos:",
    "changeYposBy:",
    "ypos:",
    "bounceOffEdge",
    "setRotationStyle",
    "xpos",
    "ypos",
    "heading",
];

const LOOKS: &[&str] = &[
    "say:duration:elapsed:from:",
    "say:",
    "think:duration:elapsed:from:",
    "think:",
    "show",
    "hide",
    "lookLike:",
    "nextCostume",
    "startScene",
    "startSceneAndWait",
    "nextScene",
    "changeGraphicEffect:by:",
    "setGraphicEffect:to:",
    "filterReset",
    "changeSizeBy:",
    "setSizeTo:",
    "comeToFront",
    "goBackByLayers:",
    "costumeIndex",
    "costumeName",
    "sceneName",
    "scale",
    "backgroundIndex",
];

const SOUND: &[&str] = &[
    "playSound:",
    "doPlaySoundAndWait",
    "stopAllSounds",
    "playDrum",
    "drum:duration:elapsed:from:",
    "rest:elapsed:from:",
    "noteOn:duration:elapsed:from:",
    "instrument:",
    "midiInstrument:",
    "changeVolumeBy:",
    "setVolumeTo:",
    "volume",
    "changeTempoBy:",
    "setTempoTo:",
    "tempo",
];

const PEN: &[&str] = &[
    "clearPenTrails",
    "stampCostume",
    "putPenDown",
    "putPenUp",
    "penColor:",
    "changePenHueBy:",
    "setPenHueTo:",
    "changePenShadeBy:",
    "setPenShadeTo:",
    "changePenSizeBy:",
    "penSize:",
];

const DATA: &[&str] = &[
    "readVariable",
    "setVar:to:",
    "changeVar:by:",
    "showVariable:",
    "hideVariable:",
    "contentsOfList:",
    "append:toList:",
    "deleteLine:ofList:",
    "insert:at:ofList:",
    "setLine:ofList:to:",
    "getLine:ofList:",
    "lineCountOfList:",
    "list:contains:",
    "showList:",
    "hideList:",
];

const EVENTS: &[&str] = &[
    "whenGreenFlag",
    "whenKeyPressed",
    "whenClicked",
    "whenSceneStarts",
    "whenSensorGreaterThan",
    "whenIReceive",
    "broadcast:",
    "doBroadcastAndWait",
];

const CONTROL: &[&str] = &[
    "wait:elapsed:from:",
    "doRepeat",
    "doForever",
    "doIf",
    "doIfElse",
    "doWaitUntil",
    "doUntil",
    "stopScripts",
    "whenCloned",
    "createCloneOf",
    "deleteClone",
];

const SENSING: &[&str] = &[
    "touching:",
    "touchingColor:",
    "color:sees:",
    "distanceTo:",
    "doAsk",
    "answer",
    "keyPressed:",
    "mousePressed",
    "mouseX",
    "mouseY",
    "soundLevel",
    "senseVideoMotion",
    "setVideoState",
    "setVideoTransparency",
    "timer",
    "timerReset",
    "getAttribute:of:",
    "timeAndDate",
    "timestamp",
    "getUserName",
];

const OPERATORS: &[&str] = &[
    "+",
    "-",
    "*",
    "/",
    "randomFrom:to:",
    "<",
    "=",
    ">",
    "&",
    "|",
    "not",
    "concatenate:with:",
    "letter:of:",
    "stringLength:",
    "\\\\",
    "rounded",
    "computeFunction:of:",
];

const MORE_BLOCKS: &[&str] = &["procDef", "call", "getParam"];

#[derive(Debug, Clone)]
pub struct Sb2Catalog {
    table: HashMap<String, BlockCategory>,
}

impl Default for Sb2Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Sb2Catalog {
    pub fn new() -> Self {
        let groups: [(BlockCategory, &[&str]); 10] = [
            (BlockCategory::Motion, MOTION),
            (BlockCategory::Looks, LOOKS),
            (BlockCategory::Sound, SOUND),
            (BlockCategory::Pen, PEN),
            (BlockCategory::Data, DATA),
            (BlockCategory::Events, EVENTS),
            (BlockCategory::Control, CONTROL),
            (BlockCategory::Sensing, SENSING),
            (BlockCategory::Operators, OPERATORS),
            (BlockCategory::MoreBlocks, MORE_BLOCKS),
        ];
        let mut table = HashMap::new();
        for (category, opcodes) in groups {
            for opcode in opcodes {
                table.insert((*opcode).to_string(), category);
            }
        }
        Self { table }
    }

    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (S, BlockCategory)>,
        S: Into<String>,
    {
        for (opcode, category) in overrides {
            self.table.insert(opcode.into(), category);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl BlockClassifier for Sb2Catalog {
    fn classify(&self, block: &str) -> Option<BlockCategory> {
        self.table.get(block).copied()
    }
}
