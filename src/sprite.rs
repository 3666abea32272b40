use crate::category::{BlockCategory, BlockClassifier, CategoryCounts};
use crate::fields::{optional_array, require_array, require_str, shape_name, MalformedInputError};
use serde_json::Value;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    pub allow_missing_collections: bool,
}

#[derive(Debug, Clone)]
pub struct SpriteRecord {
    name: String,
    script_count: usize,
    variable_count: usize,
    list_count: usize,
    script_comment_count: usize,
    sound_count: usize,
    costume_count: usize,
    categories: CategoryCounts,
    variables: Vec<String>,
    lists: Vec<String>,
    scripts_text: String,
}

impl SpriteRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn script_count(&self) -> usize {
        self.script_count
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn list_count(&self) -> usize {
        self.list_count
    }

    pub fn script_comment_count(&self) -> usize {
        self.script_comment_count
    }

    pub fn sound_count(&self) -> usize {
        self.sound_count
    }

    pub fn costume_count(&self) -> usize {
        self.costume_count
    }

    pub fn category_counts(&self) -> &CategoryCounts {
        &self.categories
    }

    pub fn blocks_in(&self, category: BlockCategory) -> usize {
        self.categories.get(category)
    }

    pub fn control_blocks(&self) -> usize {
        self.blocks_in(BlockCategory::Control)
    }

    pub fn data_blocks(&self) -> usize {
        self.blocks_in(BlockCategory::Data)
    }

    pub fn events_blocks(&self) -> usize {
        self.blocks_in(BlockCategory::Events)
    }

    pub fn looks_blocks(&self) -> usize {
        self.blocks_in(BlockCategory::Looks)
    }

    pub fn more_blocks_blocks(&self) -> usize {
        self.blocks_in(BlockCategory::MoreBlocks)
    }

    pub fn motion_blocks(&self) -> usize {
        self.blocks_in(BlockCategory::Motion)
    }

    pub fn operators_blocks(&self) -> usize {
        self.blocks_in(BlockCategory::Operators)
    }

    pub fn pen_blocks(&self) -> usize {
        self.blocks_in(BlockCategory::Pen)
    }

    pub fn sensing_blocks(&self) -> usize {
        self.blocks_in(BlockCategory::Sensing)
    }

    pub fn sound_blocks(&self) -> usize {
        self.blocks_in(BlockCategory::Sound)
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn lists(&self) -> &[String] {
        &self.lists
    }

    pub fn variable_usage_count(&self, variable: &str) -> usize {
        count_occurrences(&self.scripts_text, variable)
    }

    pub fn list_usage_count(&self, list: &str) -> usize {
        count_occurrences(&self.scripts_text, list)
    }
}

pub fn analyze(
    sprite: &Value,
    classifier: &dyn BlockClassifier,
) -> Result<SpriteRecord, MalformedInputError> {
    analyze_with_options(sprite, classifier, AnalyzeOptions::default())
}

pub fn analyze_with_options(
    sprite: &Value,
    classifier: &dyn BlockClassifier,
    options: AnalyzeOptions,
) -> Result<SpriteRecord, MalformedInputError> {
    if !sprite.is_object() {
        return Err(MalformedInputError::new(format!(
            "Sprite must be a JSON object, found {}.",
            shape_name(sprite)
        )));
    }
    let name = require_str(sprite, "objName", "Sprite")?.to_string();
    let owner = format!("Sprite '{}'", name);

    let scripts = optional_array(sprite, "scripts", &owner)?.unwrap_or(&[]);
    let variable_nodes = collection(sprite, "variables", &owner, options)?;
    let list_nodes = collection(sprite, "lists", &owner, options)?;
    let script_comments = collection(sprite, "scriptComments", &owner, options)?;
    let sounds = collection(sprite, "sounds", &owner, options)?;
    let costumes = collection(sprite, "costumes", &owner, options)?;

    let mut categories = CategoryCounts::default();
    for script in scripts {
        tally(script, classifier, &mut categories);
    }

    let variables = collect_names(variable_nodes, "name", &owner, "variable")?;
    let lists = collect_names(list_nodes, "listName", &owner, "list")?;
    let scripts_text = serde_json::to_string(scripts).map_err(|e| {
        MalformedInputError::new(format!("{} scripts could not be serialized: {}.", owner, e))
    })?;

    debug!(
        sprite = %name,
        scripts = scripts.len(),
        blocks = categories.total(),
        "analyzed sprite"
    );

    Ok(SpriteRecord {
        name,
        script_count: scripts.len(),
        variable_count: variables.len(),
        list_count: lists.len(),
        script_comment_count: script_comments.len(),
        sound_count: sounds.len(),
        costume_count: costumes.len(),
        categories,
        variables,
        lists,
        scripts_text,
    })
}

/// Walks one script tree. A sequence headed by a string is a block and is
/// counted once under its category; every nested sequence is then walked,
/// whatever its position.
pub fn tally(node: &Value, classifier: &dyn BlockClassifier, counts: &mut CategoryCounts) {
    let Some(items) = node.as_array() else {
        return;
    };
    let Some(head) = items.first() else {
        return;
    };

    if let Some(block) = head.as_str() {
        match classifier.classify(block) {
            Some(category) => counts.increment(category),
            None => trace!(block = %block, "unclassified block"),
        }
    }

    for item in items {
        if item.is_array() {
            tally(item, classifier, counts);
        }
    }
}

fn collection<'a>(
    sprite: &'a Value,
    key: &str,
    owner: &str,
    options: AnalyzeOptions,
) -> Result<&'a [Value], MalformedInputError> {
    if options.allow_missing_collections {
        Ok(optional_array(sprite, key, owner)?.unwrap_or(&[]))
    } else {
        require_array(sprite, key, owner)
    }
}

fn collect_names(
    nodes: &[Value],
    key: &str,
    owner: &str,
    kind: &str,
) -> Result<Vec<String>, MalformedInputError> {
    let mut out = Vec::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        if !node.is_object() {
            return Err(MalformedInputError::new(format!(
                "{} {} #{} must be an object, found {}.",
                owner,
                kind,
                idx,
                shape_name(node)
            )));
        }
        let name = require_str(node, key, &format!("{} {} #{}", owner, kind, idx))?;
        out.push(name.to_string());
    }
    Ok(out)
}

/// Counts occurrences of `token` in `text`, overlapping ones included: the
/// search resumes one character after each match start.
pub fn count_occurrences(text: &str, token: &str) -> usize {
    if token.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut pos = 0;
    while let Some(found) = text[pos..].find(token) {
        let start = pos + found;
        count += 1;
        let step = text[start..].chars().next().map_or(1, char::len_utf8);
        pos = start + step;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Sb2Catalog;
    use serde_json::json;

    fn scenario_classifier(name: &str) -> Option<BlockCategory> {
        match name {
            "motion_move" | "motion_turn" => Some(BlockCategory::Motion),
            "control_if" => Some(BlockCategory::Control),
            _ => None,
        }
    }

    fn sprite_with_scripts(scripts: Value) -> Value {
        json!({
            "objName": "Sprite1",
            "scripts": scripts,
            "variables": [],
            "lists": [],
            "scriptComments": [],
            "sounds": [],
            "costumes": []
        })
    }

    fn headed_sequences(node: &Value) -> usize {
        let Some(items) = node.as_array() else {
            return 0;
        };
        let own = usize::from(items.first().map_or(false, Value::is_string));
        own + items.iter().map(headed_sequences).sum::<usize>()
    }

    #[test]
    fn nested_blocks_are_counted_by_category() {
        let sprite = sprite_with_scripts(json!([
            ["motion_move", 10],
            ["control_if", ["motion_turn", 5]]
        ]));
        let record = analyze(&sprite, &scenario_classifier).unwrap();
        assert_eq!(record.motion_blocks(), 2);
        assert_eq!(record.control_blocks(), 1);
        assert_eq!(record.category_counts().total(), 3);
        assert_eq!(record.script_count(), 2);
    }

    #[test]
    fn empty_scripts_yield_zero_counts() {
        let record = analyze(&sprite_with_scripts(json!([])), &scenario_classifier).unwrap();
        assert_eq!(record.category_counts().total(), 0);
        assert_eq!(record.script_count(), 0);
        assert!(record.variables().is_empty());
        assert!(record.lists().is_empty());
    }

    #[test]
    fn absent_or_null_scripts_are_the_base_case() {
        let mut sprite = sprite_with_scripts(json!(null));
        let record = analyze(&sprite, &scenario_classifier).unwrap();
        assert_eq!(record.category_counts().total(), 0);

        sprite.as_object_mut().unwrap().remove("scripts");
        let record = analyze(&sprite, &scenario_classifier).unwrap();
        assert_eq!(record.script_count(), 0);
        assert_eq!(record.variable_usage_count("x"), 0);
    }

    #[test]
    fn unknown_blocks_contribute_nothing() {
        let sprite = sprite_with_scripts(json!([["foo_bar", ["foo_bar"]]]));
        let record = analyze(&sprite, &scenario_classifier).unwrap();
        for (_, count) in record.category_counts().iter() {
            assert_eq!(count, 0);
        }
    }

    #[test]
    fn every_nested_sequence_is_visited_including_the_head() {
        let mut counts = CategoryCounts::default();
        let node = json!([["motion_move"], "control_if", [[["motion_turn"]]]]);
        tally(&node, &scenario_classifier, &mut counts);
        assert_eq!(counts.get(BlockCategory::Motion), 2);
        assert_eq!(counts.get(BlockCategory::Control), 0);
    }

    #[test]
    fn scalars_and_objects_are_leaves() {
        let mut counts = CategoryCounts::default();
        tally(&json!("motion_move"), &scenario_classifier, &mut counts);
        tally(&json!({ "a": ["motion_move"] }), &scenario_classifier, &mut counts);
        tally(&json!([10, 20, {"x": ["motion_move"]}]), &scenario_classifier, &mut counts);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn sibling_order_does_not_change_tallies() {
        let forward = sprite_with_scripts(json!([
            [0, 0, [["motion_move", 1], ["control_if", ["motion_turn"], ["foo"]]]],
            [5, 5, [["control_if", ["control_if"]]]]
        ]));
        let reversed = sprite_with_scripts(json!([
            [5, 5, [["control_if", ["control_if"]]]],
            [0, 0, [["control_if", ["foo"], ["motion_turn"]], ["motion_move", 1]]]
        ]));
        let a = analyze(&forward, &scenario_classifier).unwrap();
        let b = analyze(&reversed, &scenario_classifier).unwrap();
        assert_eq!(a.category_counts(), b.category_counts());
    }

    #[test]
    fn category_total_never_exceeds_headed_sequences() {
        let scripts = json!([
            [10, 10, [["whenGreenFlag"], ["doForever", [["forward:", 10], ["bogus"]]]]],
            [["doIf", ["touching:", "edge"], [["turnRight:", 15]]]],
            ["call", "jump %n", ["+", 1, ["*", 2, 3]]]
        ]);
        let sprite = sprite_with_scripts(scripts.clone());
        let record = analyze(&sprite, &Sb2Catalog::new()).unwrap();
        let visited: usize = scripts.as_array().unwrap().iter().map(headed_sequences).sum();
        assert!(record.category_counts().total() <= visited);
        assert_eq!(record.category_counts().total(), visited - 1);
        assert_eq!(record.more_blocks_blocks(), 1);
        assert_eq!(record.operators_blocks(), 2);
        assert_eq!(record.events_blocks(), 1);
    }

    #[test]
    fn element_counts_and_names_follow_input() {
        let sprite = json!({
            "objName": "Cat",
            "scripts": [[0, 0, [["setVar:to:", "score", 0]]]],
            "variables": [
                { "name": "score", "value": 0, "isPersistent": false },
                { "name": "lives", "value": 3, "isPersistent": false }
            ],
            "lists": [{ "listName": "inventory", "contents": [] }],
            "scriptComments": [[10, 10, 150, 19, true, -1, "note"]],
            "sounds": [{ "soundName": "meow" }, { "soundName": "pop" }],
            "costumes": [{ "costumeName": "a" }, { "costumeName": "b" }, { "costumeName": "c" }]
        });
        let record = analyze(&sprite, &Sb2Catalog::new()).unwrap();
        assert_eq!(record.name(), "Cat");
        assert_eq!(record.variables(), ["score", "lives"]);
        assert_eq!(record.variables().len(), record.variable_count());
        assert_eq!(record.lists(), ["inventory"]);
        assert_eq!(record.lists().len(), record.list_count());
        assert_eq!(record.script_comment_count(), 1);
        assert_eq!(record.sound_count(), 2);
        assert_eq!(record.costume_count(), 3);
        assert_eq!(record.data_blocks(), 1);
        assert_eq!(record.variable_usage_count("score"), 1);
        assert_eq!(record.variable_usage_count("lives"), 0);
    }

    #[test]
    fn missing_required_field_fails() {
        let mut sprite = sprite_with_scripts(json!([]));
        sprite.as_object_mut().unwrap().remove("sounds");
        let err = analyze(&sprite, &scenario_classifier).unwrap_err();
        assert_eq!(err.message, "Sprite 'Sprite1' is missing required field 'sounds'.");

        let nameless = json!({ "scripts": [] });
        assert!(analyze(&nameless, &scenario_classifier).is_err());
        assert!(analyze(&json!([1, 2]), &scenario_classifier).is_err());
    }

    #[test]
    fn missing_collections_can_be_allowed() {
        let sprite = json!({ "objName": "Bare", "scripts": [["motion_move"]] });
        let options = AnalyzeOptions {
            allow_missing_collections: true,
        };
        let record = analyze_with_options(&sprite, &scenario_classifier, options).unwrap();
        assert_eq!(record.motion_blocks(), 1);
        assert_eq!(record.costume_count(), 0);

        let wrong_shape = json!({ "objName": "Bad", "costumes": "none" });
        assert!(analyze_with_options(&wrong_shape, &scenario_classifier, options).is_err());
    }

    #[test]
    fn malformed_variable_entries_fail_fast() {
        let mut sprite = sprite_with_scripts(json!([]));
        sprite["variables"] = json!([{ "name": "ok" }, { "value": 1 }]);
        let err = analyze(&sprite, &scenario_classifier).unwrap_err();
        assert!(err.message.contains("variable #1"));

        sprite["variables"] = json!([]);
        sprite["lists"] = json!(["inventory"]);
        let err = analyze(&sprite, &scenario_classifier).unwrap_err();
        assert!(err.message.contains("list #0 must be an object"));
    }

    #[test]
    fn stage_counts_mod_and_backdrop_number_blocks() {
        let stage = json!({
            "objName": "Stage",
            "scripts": [["say:", "x"], ["\\\\", 7, 3], ["backgroundIndex"]],
            "variables": [],
            "lists": [],
            "scriptComments": [],
            "sounds": [],
            "costumes": []
        });
        let record = analyze(&stage, &Sb2Catalog::new()).unwrap();
        assert_eq!(record.operators_blocks(), 1);
        assert_eq!(record.looks_blocks(), 2);
    }

    #[test]
    fn occurrences_include_overlaps() {
        assert_eq!(count_occurrences("aaa", "aa"), 2);
        assert_eq!(count_occurrences("[\"readVariable\",\"score\"]", "score"), 1);
        assert_eq!(count_occurrences("abc", "d"), 0);
        assert_eq!(count_occurrences("abc", ""), 0);
        assert_eq!(count_occurrences("ééé", "éé"), 2);
    }

    #[test]
    fn usage_counts_are_substring_based() {
        let sprite = json!({
            "objName": "Counter",
            "scripts": [[0, 0, [
                ["setVar:to:", "count", 0],
                ["changeVar:by:", "counter", 1],
                ["append:toList:", "count", "items"]
            ]]],
            "variables": [{ "name": "count" }, { "name": "counter" }],
            "lists": [{ "listName": "items" }],
            "scriptComments": [],
            "sounds": [],
            "costumes": []
        });
        let record = analyze(&sprite, &Sb2Catalog::new()).unwrap();
        assert_eq!(record.variable_usage_count("count"), 3);
        assert_eq!(record.variable_usage_count("counter"), 1);
        assert_eq!(record.list_usage_count("items"), 1);
    }
}
