//! End-to-end tests for the decision engine

use std::collections::HashMap;
use std::time::Duration;
use verdict_sdk::{
    compile_and_evaluate, BusinessKnowledgeModel, Decision, DecisionEngine, Definitions, Import,
    InputData, ItemDefinition, Value,
};
use verdict_runtime::{FailureKind, ModelRegistry, NodeState, TypeValidator};

fn inputs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn evaluation_is_deterministic() {
    let values = inputs(&[("x", Value::number(7))]);
    let first = compile_and_evaluate("x * 2 + 1", values.clone());
    let second = compile_and_evaluate("x * 2 + 1", values);
    assert_eq!(first, second);
    assert_eq!(first.value(), Some(&Value::number(15)));
}

#[test]
fn null_propagation_semantics() {
    assert_eq!(
        compile_and_evaluate("null + 1", HashMap::new()).value(),
        Some(&Value::Null)
    );
    assert_eq!(
        compile_and_evaluate("false and null", HashMap::new()).value(),
        Some(&Value::Boolean(false))
    );
    assert_eq!(
        compile_and_evaluate("true or null", HashMap::new()).value(),
        Some(&Value::Boolean(true))
    );
    assert_eq!(
        compile_and_evaluate("null and null", HashMap::new()).value(),
        Some(&Value::Null)
    );
}

#[test]
fn unary_test_range_constrains_values() {
    let model = Definitions::new("m", "ns1")
        .with_item_definition(
            ItemDefinition::new("Score")
                .with_type_ref("number")
                .with_allowed_values("[1..5]"),
        )
        .with_input_data(InputData::new("raw").with_type_ref("number"))
        .with_decision(
            Decision::literal("score", "raw")
                .requires_input("raw")
                .with_type_ref("Score"),
        );

    let engine = DecisionEngine::builder().with_model(model).build().unwrap();

    let ok = engine
        .evaluate_all("ns1", inputs(&[("raw", Value::number(3))]))
        .unwrap();
    assert!(ok.decision("score").unwrap().warnings.is_empty());

    let violating = engine
        .evaluate_all("ns1", inputs(&[("raw", Value::number(6))]))
        .unwrap();
    let node = violating.decision("score").unwrap();
    assert_eq!(node.warnings.len(), 1);
    assert!(node.warnings[0].message.contains("[1..5]"));
}

#[test]
fn structural_collection_validation_reports_per_field() {
    let model = Definitions::new("m", "ns1").with_item_definition(
        ItemDefinition::new("People")
            .with_component(ItemDefinition::new("name").with_type_ref("string"))
            .with_component(ItemDefinition::new("age").with_type_ref("number"))
            .as_collection(),
    );

    let mut models = ModelRegistry::new();
    models.register(model).unwrap();
    let validator = TypeValidator::new(&models);

    let valid = Value::from_json(serde_json::json!([
        {"name": "A", "age": 1},
        {"name": "B", "age": 2}
    ]));
    assert!(validator.validate(&valid, "ns1", "People").is_valid());

    let invalid = Value::from_json(serde_json::json!([{"name": "A"}]));
    let outcome = validator.validate(&invalid, "ns1", "People");
    assert_eq!(outcome.violations.len(), 1);
    assert_eq!(outcome.violations[0].path, "[0].age");
}

#[test]
fn dependency_ordering_and_failure_propagation() {
    let model = Definitions::new("m", "ns1")
        .with_input_data(InputData::new("divisor").with_type_ref("number"))
        .with_decision(Decision::literal("D1", "10 / divisor").requires_input("divisor"))
        .with_decision(Decision::literal("D2", "D1 + 1").requires_decision("D1"))
        .with_decision(Decision::literal("D3", "D2 + 1").requires_decision("D2"));
    let engine = DecisionEngine::builder().with_model(model).build().unwrap();

    // Healthy run: values flow D1 -> D2 -> D3
    let run = engine
        .evaluate_all("ns1", inputs(&[("divisor", Value::number(2))]))
        .unwrap();
    assert_eq!(run.context.get("D3"), Some(&Value::number(7)));

    // Forcing D1 to fail marks D2 and D3 dependency-unsatisfied, without
    // any panic or early abort
    let run = engine
        .evaluate_all("ns1", inputs(&[("divisor", Value::number(0))]))
        .unwrap();
    assert!(run.completed);
    assert_eq!(
        run.decision("D1").unwrap().result.as_failure().unwrap().kind,
        FailureKind::Evaluation
    );
    for name in ["D2", "D3"] {
        assert_eq!(
            run.decision(name).unwrap().result.as_failure().unwrap().kind,
            FailureKind::DependencyUnsatisfied
        );
    }
}

#[test]
fn cycle_members_fail_while_unrelated_succeeds() {
    let model = Definitions::new("m", "ns1")
        .with_decision(Decision::literal("A", "B + 1").requires_decision("B"))
        .with_decision(Decision::literal("B", "A + 1").requires_decision("A"))
        .with_decision(Decision::literal("C", "99"));
    let engine = DecisionEngine::builder().with_model(model).build().unwrap();

    let run = engine.evaluate_all("ns1", HashMap::new()).unwrap();

    for name in ["A", "B"] {
        assert_eq!(
            run.decision(name).unwrap().result.as_failure().unwrap().kind,
            FailureKind::Structural
        );
    }
    assert_eq!(run.context.get("C"), Some(&Value::number(99)));
}

#[test]
fn import_resolution_across_namespaces() {
    let imported = Definitions::new("customers", "ns2").with_item_definition(
        ItemDefinition::new("Customer")
            .with_component(ItemDefinition::new("name").with_type_ref("string")),
    );
    let importing = Definitions::new("orders", "ns1").with_import(Import::new("ns2"));

    let mut models = ModelRegistry::new();
    models.register(imported).unwrap();
    models.register(importing).unwrap();
    let validator = TypeValidator::new(&models);

    let customer = Value::from_json(serde_json::json!({"name": "Acme"}));
    assert!(validator
        .validate(&customer, "ns1", "ns2.Customer")
        .is_valid());

    // Absent model: the reference is Unresolved, not a crash
    let mut sparse = ModelRegistry::new();
    sparse
        .register(Definitions::new("orders", "ns1").with_import(Import::new("ns2")))
        .unwrap();
    let sparse_validator = TypeValidator::new(&sparse);
    assert!(sparse_validator
        .validate(&customer, "ns1", "ns2.Customer")
        .is_valid());
}

#[test]
fn business_knowledge_models_are_invocable() {
    let model = Definitions::new("pricing", "ns1")
        .with_knowledge_model(BusinessKnowledgeModel::function(
            "tax",
            vec!["amount"],
            "amount * 0.25",
        ))
        .with_knowledge_model(
            BusinessKnowledgeModel::function("total", vec!["amount"], "amount + tax(amount)")
                .requires_knowledge("tax"),
        )
        .with_input_data(InputData::new("net").with_type_ref("number"))
        .with_decision(
            Decision::literal("gross", "total(net)")
                .requires_input("net")
                .requires_knowledge("total"),
        );
    let engine = DecisionEngine::builder().with_model(model).build().unwrap();

    let run = engine
        .evaluate_all("ns1", inputs(&[("net", Value::number(100))]))
        .unwrap();
    assert_eq!(run.context.get("gross"), Some(&Value::number(125)));
}

#[test]
fn evaluate_decision_by_name_runs_only_its_closure() {
    let model = Definitions::new("m", "ns1")
        .with_decision(Decision::literal("wanted", "1 + 1"))
        .with_decision(Decision::literal("broken", "1 / 0"));
    let engine = DecisionEngine::builder().with_model(model).build().unwrap();

    // The broken sibling is outside the closure and never evaluated
    let result = engine
        .evaluate_decision("ns1", "wanted", HashMap::new())
        .unwrap();
    assert_eq!(result.value(), Some(&Value::number(2)));
}

#[test]
fn expired_deadline_fails_remaining_nodes() {
    let model = Definitions::new("m", "ns1")
        .with_decision(Decision::literal("D1", "1"))
        .with_decision(Decision::literal("D2", "2"));
    let engine = DecisionEngine::builder()
        .with_model(model)
        .with_config(verdict_sdk::EngineConfig::new().with_deadline(Duration::from_secs(0)))
        .build()
        .unwrap();

    let run = engine.evaluate_all("ns1", HashMap::new()).unwrap();
    assert!(run.completed);
    for name in ["D1", "D2"] {
        assert_eq!(
            run.decision(name).unwrap().result.as_failure().unwrap().kind,
            FailureKind::Timeout
        );
    }
}

#[test]
fn strict_mode_overturns_type_violations() {
    let model = Definitions::new("m", "ns1")
        .with_decision(Decision::literal("D1", "\"text\"").with_type_ref("number"));
    let engine = DecisionEngine::builder()
        .with_model(model)
        .with_config(verdict_sdk::EngineConfig::new().strict())
        .build()
        .unwrap();

    let run = engine.evaluate_all("ns1", HashMap::new()).unwrap();
    let node = run.decision("D1").unwrap();
    assert_eq!(node.state, NodeState::Failed);
    assert_eq!(
        node.result.as_failure().unwrap().kind,
        FailureKind::Validation
    );
}

#[test]
fn model_ingestion_from_yaml_document() {
    // The exchange-format binding layer lives outside the engine; an
    // already-parsed tree is all the engine accepts. Serde makes a YAML
    // rendering of that tree directly loadable in tests.
    let yaml = r#"
name: loans
namespace: ns1
input_data:
  - name: amount
    variable: { name: amount, type_ref: number }
decisions:
  - name: approved
    variable: { name: approved, type_ref: boolean }
    decision_logic: { kind: literal_expression, text: "amount < 1000" }
    information_requirements:
      - { kind: required_input, name: amount }
"#;
    let model: Definitions = serde_yaml::from_str(yaml).unwrap();
    let engine = DecisionEngine::builder().with_model(model).build().unwrap();

    let run = engine
        .evaluate_all("ns1", inputs(&[("amount", Value::number(500))]))
        .unwrap();
    assert_eq!(run.context.get("approved"), Some(&Value::Boolean(true)));
}

#[test]
fn engine_accepts_json_inputs() {
    let model = Definitions::new("m", "ns1")
        .with_input_data(InputData::new("applicant").with_type_ref("any"))
        .with_decision(
            Decision::literal("adult", "applicant.age >= 18").requires_input("applicant"),
        );
    let engine = DecisionEngine::builder().with_model(model).build().unwrap();

    let run = engine
        .evaluate_all(
            "ns1",
            DecisionEngine::inputs_from_json(serde_json::json!({
                "applicant": {"age": 21, "name": "Ada"}
            })),
        )
        .unwrap();
    assert_eq!(run.context.get("adult"), Some(&Value::Boolean(true)));
}

#[test]
fn listener_observes_run_lifecycle() {
    use std::cell::RefCell;
    use verdict_sdk::{DecisionRunResult, RuntimeListener};

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }
    impl RuntimeListener for Recorder {
        fn on_decision_started(&self, name: &str) {
            self.events.borrow_mut().push(format!("start:{}", name));
        }
        fn on_decision_succeeded(&self, name: &str, _value: &Value) {
            self.events.borrow_mut().push(format!("ok:{}", name));
        }
        fn on_run_completed(&self, _result: &DecisionRunResult) {
            self.events.borrow_mut().push("completed".to_string());
        }
    }

    let model = Definitions::new("m", "ns1").with_decision(Decision::literal("D1", "1"));
    let engine = DecisionEngine::builder().with_model(model).build().unwrap();

    let recorder = Recorder::default();
    engine
        .evaluate_all_with_listener("ns1", HashMap::new(), &recorder)
        .unwrap();

    let events = recorder.events.borrow();
    assert_eq!(
        *events,
        vec!["start:D1".to_string(), "ok:D1".to_string(), "completed".to_string()]
    );
}
