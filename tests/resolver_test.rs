//! Integration tests for path resolution and mixing.

use rstest::rstest;
use serde_json::json;

use jsonmix::domain::{
    apply_shape, factory, locate, Fields, Location, Node, PathExpr, Record, RecordFactory, Shape,
};
use jsonmix::util::testing;

#[derive(Debug, Default)]
struct Employee {
    fields: Fields,
}
jsonmix::impl_shape!(Employee);

impl Employee {
    fn greeting(&self) -> String {
        let name = self.get("name").and_then(Node::as_str).unwrap_or("?");
        format!("Hello, {}", name)
    }
}

#[derive(Debug, Default)]
struct Address {
    fields: Fields,
}
jsonmix::impl_shape!(Address);

fn company() -> Node {
    Node::from(json!({
        "name": "Acme",
        "employees": [
            {"name": "Ann", "address": {"city": "Oslo"}},
            {"name": "Bob", "address": {"city": "Rome"}}
        ],
        "offices": {
            "north": {"floor": 1},
            "south": {"floor": 2}
        }
    }))
}

fn shape_name_at<'a>(tree: &'a Node, keys: &[&str]) -> Option<&'a str> {
    let mut node = tree;
    for key in keys {
        node = node.get(key)?;
    }
    node.as_shape().map(|s| s.shape_name())
}

#[test]
fn given_empty_path_when_applying_then_root_is_mixed() {
    testing::init_test_setup();
    let mut tree = company();

    let report = apply_shape(&RecordFactory::new("Company"), &PathExpr::root(), &mut tree);

    assert_eq!(report.mixed, vec![Location::root()]);
    assert_eq!(tree.as_shape().map(|s| s.shape_name()), Some("Company"));
    assert_eq!(tree.get("name").and_then(Node::as_str), Some("Acme"));
}

#[test]
fn given_wildcard_over_array_when_applying_then_every_element_is_mixed() {
    let mut tree = company();

    let report = apply_shape(&factory::<Employee>(), &PathExpr::parse("employees.*"), &mut tree);

    assert_eq!(report.mixed_count(), 2);
    let employees = tree.get("employees").and_then(Node::as_array).unwrap();
    let greetings: Vec<_> = employees
        .iter()
        .map(|e| e.downcast_ref::<Employee>().unwrap().greeting())
        .collect();
    assert_eq!(greetings, ["Hello, Ann", "Hello, Bob"]);
}

#[test]
fn given_wildcard_then_key_when_applying_then_nested_objects_are_mixed() {
    let mut tree = company();

    let report = apply_shape(
        &factory::<Address>(),
        &PathExpr::parse("employees.*.address"),
        &mut tree,
    );

    assert_eq!(
        report.mixed,
        vec![
            Location::root().key("employees").index(0).key("address"),
            Location::root().key("employees").index(1).key("address"),
        ]
    );
    assert_eq!(shape_name_at(&tree, &["employees", "0", "address"]), Some("Address"));
    assert_eq!(shape_name_at(&tree, &["employees", "1", "address"]), Some("Address"));
    // the element itself stays plain
    assert!(!tree.get("employees").and_then(|e| e.get("0")).unwrap().is_mixed());
}

#[test]
fn given_wildcard_over_mapping_when_applying_then_every_value_is_mixed() {
    let mut tree = company();

    let report = apply_shape(&RecordFactory::new("Office"), &PathExpr::parse("offices.*"), &mut tree);

    assert_eq!(report.mixed_count(), 2);
    assert_eq!(shape_name_at(&tree, &["offices", "north"]), Some("Office"));
    assert_eq!(shape_name_at(&tree, &["offices", "south"]), Some("Office"));
}

#[test]
fn given_wildcard_at_array_root_when_applying_then_elements_are_mixed() {
    let mut tree = Node::from(json!([{"id": 1}, {"id": 2}, 7]));

    let report = apply_shape(&RecordFactory::new("Item"), &PathExpr::parse("*"), &mut tree);

    assert_eq!(report.mixed_count(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].location, Location::root().index(2));
    assert_eq!(report.skipped[0].found, "number");
    let items = tree.as_array().unwrap();
    assert!(items[0].is_mixed() && items[1].is_mixed());
    assert_eq!(items[2].as_i64(), Some(7));
}

#[rstest]
#[case::missing_key("nobody")]
#[case::missing_nested_key("offices.east")]
#[case::through_scalar("name.first")]
#[case::missing_under_mapping_value("offices.north.desk")]
fn given_unmatched_path_when_applying_then_tree_is_unchanged(#[case] path: &str) {
    let mut tree = company();
    let before = tree.to_json();

    let report = apply_shape(&RecordFactory::new("X"), &PathExpr::parse(path), &mut tree);

    assert_eq!(report.mixed_count(), 0);
    assert!(report.is_clean());
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(tree.to_json(), before);
}

#[test]
fn given_scalar_target_when_applying_then_left_untouched_and_reported() {
    let mut tree = Node::from(json!({"items": ["a", {"b": 1}]}));

    let report = apply_shape(&RecordFactory::new("Item"), &PathExpr::parse("items.*"), &mut tree);

    assert_eq!(report.mixed, vec![Location::root().key("items").index(1)]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].found, "string");
    assert_eq!(tree.to_json(), json!({"items": ["a", {"b": 1}]}));
}

#[test]
fn given_decimal_key_on_array_document_when_applying_then_addresses_index() {
    let mut tree = Node::from(json!([{"id": 1}, {"id": 2}]));

    let report = apply_shape(&RecordFactory::new("Item"), &PathExpr::parse("1"), &mut tree);

    assert_eq!(report.mixed, vec![Location::root().index(1)]);
    let items = tree.as_array().unwrap();
    assert!(!items[0].is_mixed());
    assert!(items[1].is_mixed());
}

#[test]
fn given_index_out_of_range_when_applying_then_unresolved() {
    let mut tree = Node::from(json!([{"id": 1}]));

    let report = apply_shape(&RecordFactory::new("Item"), &PathExpr::parse("3"), &mut tree);

    assert_eq!(report.mixed_count(), 0);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].at, Location::root());
}

#[test]
fn given_key_over_array_when_applying_then_elements_are_addressed_not_indices() {
    let mut tree = company();

    let report = apply_shape(&factory::<Employee>(), &PathExpr::parse("employees.1"), &mut tree);

    // the key descends into every element, where "1" is an ordinary missing field
    assert_eq!(report.mixed_count(), 0);
    assert_eq!(report.unresolved.len(), 2);
}

#[test]
fn given_double_wildcard_when_applying_then_both_levels_broadcast() {
    let mut tree = Node::from(json!({"a": {"x": {"v": 1}}, "b": {"y": {"v": 2}, "z": 3}}));

    let report = apply_shape(&RecordFactory::new("Leaf"), &PathExpr::parse("*.*"), &mut tree);

    assert_eq!(
        report.mixed,
        vec![Location::root().key("a").key("x"), Location::root().key("b").key("y")]
    );
    assert_eq!(report.skipped.len(), 1);
    assert!(!tree.get("a").unwrap().is_mixed());
}

#[test]
fn given_key_star_over_mapping_when_applying_then_parent_stays_plain() {
    let mut tree = company();

    apply_shape(&RecordFactory::new("Office"), &PathExpr::parse("offices.*"), &mut tree);

    assert!(!tree.get("offices").unwrap().is_mixed());
    assert_eq!(shape_name_at(&tree, &["offices", "north"]), Some("Office"));
}

#[test]
fn given_mixed_parent_when_applying_nested_path_then_descends_through_shape() {
    let mut tree = company();
    apply_shape(&RecordFactory::new("Company"), &PathExpr::root(), &mut tree);

    let report = apply_shape(&factory::<Employee>(), &PathExpr::parse("employees.*"), &mut tree);

    assert_eq!(report.mixed_count(), 2);
    assert_eq!(tree.as_shape().map(|s| s.shape_name()), Some("Company"));
    assert_eq!(shape_name_at(&tree, &["employees", "0"]), Some("Employee"));
}

#[test]
fn given_mixed_element_when_downcasting_mutably_then_edits_land_in_tree() {
    let mut tree = Node::from(json!([{"name": "Ann"}]));
    apply_shape(&factory::<Employee>(), &PathExpr::parse("*"), &mut tree);

    let Node::Array(items) = &mut tree else {
        panic!("root stays an array");
    };
    let ann = items[0].downcast_mut::<Employee>().expect("element is an Employee");
    ann.assign("name".into(), Node::from("Anna"));

    assert_eq!(tree.to_json(), json!([{"name": "Anna"}]));
}

#[test]
fn given_already_mixed_node_when_applying_again_then_reshaped_with_same_data() {
    let mut tree = company();
    apply_shape(&RecordFactory::new("First"), &PathExpr::parse("offices.north"), &mut tree);

    apply_shape(&RecordFactory::new("Second"), &PathExpr::parse("offices.north"), &mut tree);

    let north = tree.get("offices").and_then(|o| o.get("north")).unwrap();
    assert_eq!(north.as_shape().map(|s| s.shape_name()), Some("Second"));
    assert_eq!(north.to_json(), json!({"floor": 1}));
}

#[test]
fn given_factory_defaults_when_mixing_then_source_fields_win() {
    let defaults = json!({"floor": 0, "open": true});
    let shape = RecordFactory::new("Office").with_defaults(defaults.as_object().unwrap().clone());
    let mut tree = company();

    apply_shape(&shape, &PathExpr::parse("offices.south"), &mut tree);

    let south = tree.get("offices").and_then(|o| o.get("south")).unwrap();
    assert_eq!(south.to_json(), json!({"floor": 2, "open": true}));
}

#[test]
fn given_nested_array_when_mixing_then_values_are_moved_not_copied() {
    let mut tree = Node::from(json!({"team": {"tags": ["a", "b", "c"]}}));
    let before = tree
        .get("team")
        .and_then(|t| t.get("tags"))
        .and_then(Node::as_array)
        .unwrap()
        .as_ptr();

    apply_shape(&factory::<Record>(), &PathExpr::parse("team"), &mut tree);

    let after = tree
        .get("team")
        .and_then(|t| t.get("tags"))
        .and_then(Node::as_array)
        .unwrap()
        .as_ptr();
    assert_eq!(before, after);
}

#[test]
fn given_mixed_nested_value_when_parent_is_mixed_then_child_keeps_its_shape() {
    let mut tree = company();
    apply_shape(&factory::<Address>(), &PathExpr::parse("employees.*.address"), &mut tree);

    apply_shape(&factory::<Employee>(), &PathExpr::parse("employees.*"), &mut tree);

    let ann = tree.get("employees").and_then(|e| e.get("0")).unwrap();
    assert!(ann.downcast_ref::<Employee>().is_some());
    assert!(ann.get("address").unwrap().downcast_ref::<Address>().is_some());
}

#[test]
fn given_path_when_locating_then_matches_apply_without_mutation() {
    let tree = company();
    let path = PathExpr::parse("employees.*.address");

    let located = locate(&path, &tree);

    let mut copy = company();
    let report = apply_shape(&factory::<Address>(), &path, &mut copy);
    assert_eq!(located, report.mixed);
    assert!(!tree
        .get("employees")
        .and_then(|e| e.get("0"))
        .and_then(|e| e.get("address"))
        .unwrap()
        .is_mixed());
    assert_eq!(located[0].to_string(), "$.employees[0].address");
}
