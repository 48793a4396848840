//! End-to-end shape selection tests through the public API.

use connected_blocks::{
    enumerate_transform_variants, load_template_from_str, load_template_library_from_bytes,
    select_shape, Direction, EvaluationContext, Matcher, NeighborInfo, NeighborQuery,
    Neighborhood, Pattern, Position, Selection, Template, Trigger, Yaw,
};
use std::collections::HashMap;
use std::io::Write;

fn stone_rule_template() -> Template {
    load_template_from_str(
        r#"{
            "DefaultShape": "lone",
            "Shapes": {
                "lone": {},
                "joined": {
                    "PatternsToMatchAnyOf": [ {
                        "RulesToMatch": [
                            { "Position": {"X": 1, "Y": 0, "Z": 0}, "IncludeOrExclude": "Include", "BlockTypes": ["stone"] }
                        ]
                    } ]
                }
            }
        }"#,
    )
    .unwrap()
}

#[test]
fn test_single_stone_rule() {
    let template = stone_rule_template();

    let stone = Neighborhood::new().with(Position::new(1, 0, 0), NeighborInfo::new("stone"));
    let selection = select_shape(&template, "joined", &EvaluationContext::placement(&stone));
    assert_eq!(selection.shape_name(), Some("joined"));
    assert_eq!(selection.pattern_index(), Some(0));

    let dirt = Neighborhood::new().with(Position::new(1, 0, 0), NeighborInfo::new("dirt"));
    let selection = select_shape(&template, "joined", &EvaluationContext::placement(&dirt));
    assert_eq!(selection.shape_name(), Some("lone"));
    assert_eq!(selection.pattern_index(), None);
}

#[test]
fn test_empty_pattern_list_falls_through_to_default() {
    let template = load_template_from_str(
        r#"{ "DefaultShape": "flat", "Shapes": { "flat": { "PatternsToMatchAnyOf": [] } } }"#,
    )
    .unwrap();

    let neighborhoods = [
        Neighborhood::new(),
        Neighborhood::new().with(Position::new(0, -1, 0), NeighborInfo::new("grass")),
    ];
    for hood in &neighborhoods {
        for trigger in [Trigger::Placement, Trigger::Update] {
            let selection = select_shape(&template, "flat", &EvaluationContext::new(trigger, hood));
            assert_eq!(selection, Selection::Unresolved { shape_name: Some("flat".to_string()) });
            assert_eq!(selection.variant(), None);
            assert_eq!(selection.applied_yaw(), Yaw::Zero);
        }
    }
}

#[test]
fn test_empty_rules_always_match() {
    let template = load_template_from_str(
        r#"{ "DefaultShape": "a", "Shapes": { "a": {}, "b": { "PatternsToMatchAnyOf": [ { "Type": "Anything" } ] } } }"#,
    )
    .unwrap();

    let busy = Neighborhood::new()
        .with(Position::new(1, 0, 0), NeighborInfo::new("x"))
        .with(Position::new(0, 1, 0), NeighborInfo::new("y"));
    for hood in [Neighborhood::new(), busy] {
        let selection = select_shape(&template, "b", &EvaluationContext::placement(&hood));
        assert!(selection.is_resolved());
        assert!(selection.variant().unwrap().is_identity());
    }
}

#[test]
fn test_weaker_pattern_first_wins() {
    let template = load_template_from_str(
        r#"{
            "DefaultShape": "s",
            "Shapes": { "s": { "PatternsToMatchAnyOf": [
                { "Type": "Weak" },
                { "Type": "Strong", "RulesToMatch": [
                    { "Position": {"X": 0, "Y": 1, "Z": 0}, "BlockTypes": ["unobtainium"] }
                ] }
            ] } }
        }"#,
    )
    .unwrap();

    let hood = Neighborhood::new().with(Position::new(0, 1, 0), NeighborInfo::new("unobtainium"));
    let selection = select_shape(&template, "s", &EvaluationContext::placement(&hood));
    assert_eq!(selection.pattern_index(), Some(0));
}

#[test]
fn test_trigger_exclusive_patterns() {
    let template = load_template_from_str(
        r#"{
            "DefaultShape": "s",
            "Shapes": { "s": { "PatternsToMatchAnyOf": [
                { "Type": "UpdateOnly", "OnlyOnUpdate": true },
                { "Type": "PlacementOnly", "OnlyOnPlacement": true }
            ] } }
        }"#,
    )
    .unwrap();
    let hood = Neighborhood::new();

    let placed = select_shape(&template, "s", &EvaluationContext::placement(&hood));
    assert_eq!(placed.pattern_index(), Some(1));

    let updated = select_shape(&template, "s", &EvaluationContext::update(&hood));
    assert_eq!(updated.pattern_index(), Some(0));
}

#[test]
fn test_variant_counts() {
    let plain: Pattern = serde_json::from_str(
        r#"{ "RulesToMatch": [ { "Position": {"X": 1, "Y": 0, "Z": 0} } ] }"#,
    )
    .unwrap();
    assert_eq!(enumerate_transform_variants(&plain).len(), 1);

    let rotatable: Pattern = serde_json::from_str(
        r#"{
            "AllowedPatternTransformations": { "IsCardinallyRotatable": true, "MirrorX": false },
            "RulesToMatch": [ { "Position": {"X": 1, "Y": 0, "Z": 0} } ]
        }"#,
    )
    .unwrap();
    let variants = enumerate_transform_variants(&rotatable);
    assert_eq!(variants.len(), 4);
    let degrees: Vec<_> = variants.iter().map(|v| v.transform.rotation.degrees()).collect();
    assert_eq!(degrees, vec![0, 90, 180, 270]);
}

/// A world stored as absolute positions, queried relative to one block.
struct World {
    center: Position,
    blocks: HashMap<Position, NeighborInfo>,
}

impl NeighborQuery for World {
    fn get_neighbor(&self, offset: Position) -> Option<&NeighborInfo> {
        let pos = Position::new(
            self.center.x + offset.x,
            self.center.y + offset.y,
            self.center.z + offset.z,
        );
        self.blocks.get(&pos)
    }
}

#[test]
fn test_custom_neighbor_query_and_chained_shapes() {
    let template = load_template_from_str(
        r#"{
            "DefaultShape": "Single",
            "Shapes": {
                "Single": {},
                "Corner": {
                    "FaceTags": { "North": ["Open"], "East": ["Open"] },
                    "PatternsToMatchAnyOf": [ {
                        "Type": "Corner",
                        "YawToApplyAddReplacedBlockType": "Zero",
                        "AllowedPatternTransformations": { "IsCardinallyRotatable": true },
                        "RulesToMatch": [
                            { "Position": {"X": 0, "Y": 0, "Z": -1}, "Shapes": ["Single", "Corner"] },
                            { "Position": {"X": 1, "Y": 0, "Z": 0}, "Shapes": ["Single", "Corner"] },
                            { "Position": {"X": -1, "Y": 0, "Z": 0}, "IncludeOrExclude": "Exclude", "BlockTypes": ["Pipe"] }
                        ]
                    } ]
                }
            }
        }"#,
    )
    .unwrap();

    // Pipes to the south and west of (10, 64, 10).
    let center = Position::new(10, 64, 10);
    let mut blocks = HashMap::new();
    blocks.insert(
        center.neighbor(Direction::South),
        NeighborInfo::new("Pipe").with_shape("Single"),
    );
    blocks.insert(
        center.neighbor(Direction::West),
        NeighborInfo::new("Pipe").with_shape("Corner"),
    );
    let world = World { center, blocks };

    let selection = select_shape(&template, "Corner", &EvaluationContext::placement(&world));
    // North+East rotated by 180 is South+West.
    assert_eq!(selection.variant().unwrap().rotation, Yaw::OneEighty);
    assert_eq!(selection.applied_yaw(), Yaw::OneEighty);

    let tags = selection.face_tags(&template).unwrap();
    assert_eq!(tags.get(Direction::South), &["Open".to_string()]);
    assert_eq!(tags.get(Direction::West), &["Open".to_string()]);
}

#[test]
fn test_library_inheritance_then_selection() {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("Walls/Base.json", options).unwrap();
    writer
        .write_all(
            br#"{
                "DefaultShape": "Pillar",
                "Shapes": {
                    "Pillar": {},
                    "Span": { "PatternsToMatchAnyOf": [ {
                        "AllowedPatternTransformations": { "IsCardinallyRotatable": true },
                        "RulesToMatch": [
                            { "Position": {"X": 1, "Y": 0, "Z": 0}, "BlockTypeLists": ["Walls"] },
                            { "Position": {"X": -1, "Y": 0, "Z": 0}, "BlockTypeLists": ["Walls"] }
                        ]
                    } ] }
                }
            }"#,
        )
        .unwrap();
    writer.start_file("Walls/Stone.json", options).unwrap();
    writer
        .write_all(br#"{ "Parent": "Walls/Base", "DontUpdateAfterInitialPlacement": true }"#)
        .unwrap();
    let data = writer.finish().unwrap().into_inner();

    let library = load_template_library_from_bytes(&data).unwrap();
    let template = library.resolve("Walls/Stone").unwrap();
    let matcher = Matcher::new(&template);

    let hood = Neighborhood::new()
        .with(Position::new(0, 0, 1), NeighborInfo::new("Wall_Brick").with_type_list("Walls"))
        .with(Position::new(0, 0, -1), NeighborInfo::new("Wall_Stone").with_type_list("Walls"));

    let placed = matcher.resolve_shape(&EvaluationContext::placement(&hood));
    assert_eq!(placed.shape_name(), Some("Span"));
    assert_eq!(placed.applied_yaw(), Yaw::Ninety);

    let updated = matcher.resolve_shape(&EvaluationContext::update(&hood));
    assert_eq!(updated, Selection::Suppressed);
}

#[test]
fn test_concurrent_selection_over_shared_template() {
    let template = stone_rule_template();

    std::thread::scope(|scope| {
        for i in 0..4 {
            let template = &template;
            scope.spawn(move || {
                let block = if i % 2 == 0 { "stone" } else { "dirt" };
                let hood = Neighborhood::new().with(Position::new(1, 0, 0), NeighborInfo::new(block));
                let selection = select_shape(template, "joined", &EvaluationContext::placement(&hood));
                assert_eq!(selection.is_resolved(), i % 2 == 0);
            });
        }
    });
}

#[test]
fn test_mirrored_match_reports_world_faces() {
    let template = load_template_from_str(
        r#"{
            "DefaultShape": "Post",
            "Shapes": {
                "Post": {},
                "End": {
                    "FaceTags": { "East": ["Open"] },
                    "PatternsToMatchAnyOf": [ {
                        "AllowedPatternTransformations": { "MirrorX": true },
                        "RulesToMatch": [
                            { "Position": {"X": 1, "Y": 0, "Z": 0}, "BlockTypes": ["Rail"] }
                        ]
                    } ]
                }
            }
        }"#,
    )
    .unwrap();

    let hood = Neighborhood::new().with(Position::new(-1, 0, 0), NeighborInfo::new("Rail"));
    let selection = select_shape(&template, "End", &EvaluationContext::placement(&hood));

    let variant = selection.variant().unwrap();
    assert!(variant.mirror_x);
    assert!(!variant.mirror_z);
    assert_eq!(selection.applied_yaw(), Yaw::Zero);

    let tags = selection.face_tags(&template).unwrap();
    assert_eq!(tags.get(Direction::West), &["Open".to_string()]);
    assert!(tags.get(Direction::East).is_empty());
}

#[test]
fn test_offset_at_i32_min_fails_closed() {
    let template = load_template_from_str(
        r#"{
            "DefaultShape": "a",
            "Shapes": {
                "a": {},
                "b": { "PatternsToMatchAnyOf": [ {
                    "AllowedPatternTransformations": { "IsCardinallyRotatable": true },
                    "RulesToMatch": [ { "Position": {"X": -2147483648, "Y": 0, "Z": 0} } ]
                } ] }
            }
        }"#,
    )
    .unwrap();

    let hood = Neighborhood::new();
    let selection = select_shape(&template, "b", &EvaluationContext::placement(&hood));
    assert_eq!(selection, Selection::Unresolved { shape_name: Some("a".to_string()) });

    let warnings = connected_blocks::validate(&template);
    assert_eq!(warnings.len(), 1);
}

#[test]
fn test_shapes_serialize_in_name_order() {
    let template = load_template_from_str(
        r#"{ "DefaultShape": "Zeta", "Shapes": { "Zeta": {}, "Alpha": {} } }"#,
    )
    .unwrap();
    let written = serde_json::to_string(&template).unwrap();
    assert_eq!(
        written,
        r#"{"DefaultShape":"Zeta","Shapes":{"Alpha":{},"Zeta":{}}}"#
    );
    assert_eq!(template.shape_names(), vec!["Alpha", "Zeta"]);
}
