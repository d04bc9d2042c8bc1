//! Relation inference over whole diagrams, driven through the public API

use umlforge::codegen::{
    analyze, parse_attributes, utils::pluralize, Diagram, DiagramError, GenerateError,
    ManyToManyStrategy, NodeKind, RelationKind,
};

fn diagram(edges: &str) -> Diagram {
    Diagram::from_json_str(&format!(
        r#"{{
            "nodeDataArray": [
                {{"key": -1, "name": "Customer", "attribute": "name: String"}},
                {{"key": -2, "name": "Order", "attribute": "total: double"}},
                {{"key": -3, "name": "Product", "attribute": "title: String"}},
                {{"key": -4, "name": "Tag", "attribute": "label: String"}}
            ],
            "linkDataArray": [{}]
        }}"#,
        edges
    ))
    .unwrap()
}

fn kinds(diagram: &Diagram, strategy: ManyToManyStrategy, name: &str) -> Vec<(RelationKind, String)> {
    let model = analyze(diagram, strategy).unwrap();
    model
        .entities
        .values()
        .find(|e| e.name == name)
        .unwrap()
        .relations
        .iter()
        .map(|r| (r.kind, r.target.clone()))
        .collect()
}

#[test]
fn test_foreign_key_ownership_ignores_category() {
    for category in ["association", "composition", "aggregation", "composicion", "agregacion"] {
        let d = diagram(&format!(
            r#"{{"from": -1, "to": -2, "fromMultiplicity": "1", "toMultiplicity": "*", "category": "{}"}}"#,
            category
        ));
        let model = analyze(&d, ManyToManyStrategy::Forward).unwrap();

        let order = &model.entities[&-2];
        assert_eq!(order.relations.len(), 1, "category {}", category);
        assert_eq!(order.relations[0].kind, RelationKind::ManyToOne);
        assert_eq!(order.relations[0].owning_key.as_deref(), Some("customer_id"));

        let customer = &model.entities[&-1];
        assert_eq!(customer.relations[0].kind, RelationKind::OneToMany);
        assert_eq!(customer.relations[0].owning_key, None);
        assert_eq!(customer.relations[0].inverse_field.as_deref(), Some("customer"));
    }
}

#[test]
fn test_edge_direction_does_not_change_ownership() {
    let forward = diagram(r#"{"from": -1, "to": -2, "fromMultiplicity": "1", "toMultiplicity": "*"}"#);
    let reverse = diagram(r#"{"from": -2, "to": -1, "fromMultiplicity": "*", "toMultiplicity": "1"}"#);

    for d in [forward, reverse] {
        assert_eq!(
            kinds(&d, ManyToManyStrategy::Forward, "Order"),
            vec![(RelationKind::ManyToOne, "Customer".to_string())]
        );
        assert_eq!(
            kinds(&d, ManyToManyStrategy::Forward, "Customer"),
            vec![(RelationKind::OneToMany, "Order".to_string())]
        );
    }
}

#[test]
fn test_forward_many_to_many_is_one_sided() {
    let d = diagram(r#"{"from": -3, "to": -4, "fromMultiplicity": "*", "toMultiplicity": "*"}"#);

    assert_eq!(
        kinds(&d, ManyToManyStrategy::Forward, "Product"),
        vec![(RelationKind::ManyToMany, "Tag".to_string())]
    );
    assert!(kinds(&d, ManyToManyStrategy::Forward, "Tag").is_empty());
}

#[test]
fn test_join_entity_many_to_many() {
    let d = diagram(r#"{"from": -3, "to": -4, "fromMultiplicity": "*", "toMultiplicity": "*"}"#);
    let model = analyze(&d, ManyToManyStrategy::JoinEntity).unwrap();

    let names: Vec<&str> = model.entities.values().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Customer", "Order", "Product", "Tag", "ProductTag"]);

    let join = model.entities.values().last().unwrap();
    assert_eq!(join.kind, NodeKind::Synthesized);
    assert!(join.relations.iter().all(|r| r.kind == RelationKind::ManyToOne));
    assert!(model.dependencies.depends_on("ProductTag", "Product"));
    assert!(model.dependencies.depends_on("ProductTag", "Tag"));
}

#[test]
fn test_relation_order_follows_edge_order() {
    let d = diagram(
        r#"{"from": -2, "to": -1, "fromMultiplicity": "*", "toMultiplicity": "1"},
           {"from": -2, "to": -3, "fromMultiplicity": "*", "toMultiplicity": "1"},
           {"from": -2, "to": -4, "fromMultiplicity": "1", "toMultiplicity": "1"}"#,
    );

    assert_eq!(
        kinds(&d, ManyToManyStrategy::Forward, "Order"),
        vec![
            (RelationKind::ManyToOne, "Customer".to_string()),
            (RelationKind::ManyToOne, "Product".to_string()),
            (RelationKind::OneToOne, "Tag".to_string()),
        ]
    );

    // Same input, same output
    let first = analyze(&d, ManyToManyStrategy::Forward).unwrap();
    let second = analyze(&d, ManyToManyStrategy::Forward).unwrap();
    assert_eq!(first.entities, second.entities);
}

#[test]
fn test_dangling_edge_is_fatal() {
    let d = diagram(r#"{"from": -1, "to": -9, "fromMultiplicity": "1", "toMultiplicity": "*"}"#);
    let err = analyze(&d, ManyToManyStrategy::Forward).unwrap_err();

    match err {
        GenerateError::Diagram(DiagramError::DanglingEdge { missing, .. }) => assert_eq!(missing, -9),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_service_cycle_falls_back_to_repository() {
    // Customer owns a favourite Order while Order owns its Customer
    let d = diagram(
        r#"{"from": -2, "to": -1, "fromMultiplicity": "*", "toMultiplicity": "1"},
           {"from": -1, "to": -2, "fromMultiplicity": "1", "toMultiplicity": "1"}"#,
    );
    let model = analyze(&d, ManyToManyStrategy::Forward).unwrap();

    let order_deps = model.dependencies.dependencies_of("Order");
    let customer_deps = model.dependencies.dependencies_of("Customer");
    assert_eq!(order_deps.len(), 1);
    assert_eq!(customer_deps.len(), 1);

    use umlforge::codegen::Resolver;
    let resolvers = [order_deps[0].resolver, customer_deps[0].resolver];
    assert!(resolvers.contains(&Resolver::Service));
    assert!(resolvers.contains(&Resolver::Repository));
}

#[test]
fn test_malformed_attribute_lines_are_skipped() {
    let attributes = parse_attributes("name: String\nbadline\na: b: c\n\n-\nage: int", "Person");
    let names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["name", "age"]);
}

#[test]
fn test_pluralization() {
    assert_eq!(pluralize("Class"), "Classes");
    assert_eq!(pluralize("City"), "Cities");
    assert_eq!(pluralize("Child"), "Children");
    assert_eq!(pluralize("Bus"), "Buses");
    assert_eq!(pluralize("Day"), "Days");
    assert_eq!(pluralize("Order"), "Orders");
}
