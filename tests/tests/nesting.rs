//! Nested containers: structural merge, reset, and notification bubbling.

use getset_tests::prelude::*;
use pretty_assertions::assert_eq;

fn author(recorder: Option<&Recorder>) -> Result<GetSet, DefinitionError> {
    let schema = Schema::new()
        .field("name", FieldDef::new().with_type("String").with_default(""))
        .field("email", FieldDef::new().with_type("String|Null"));
    match recorder {
        Some(recorder) => GetSet::builder(schema).observer(recorder.clone()).build(),
        None => GetSet::new(schema),
    }
}

mod reset_scenario {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("reset", |recorder| {
            GetSet::builder(
                Schema::new()
                    .field("title", FieldDef::new().with_default("Draft"))
                    .nested("author", author(None)?),
            )
            .observer(recorder.clone())
            .build()
        })
        .step(
            "rename_author",
            |gs| gs.set_path("author.name", "John"),
            |a| a.changed(1).change("author.name").value("author.name", "John"),
        )
        .step(
            "reset_root",
            |gs| gs.reset_to_defaults(None),
            |a| a.change("author.name").value("author.name", "").value("title", "Draft"),
        )
        .step("reset_again_is_silent", |gs| gs.reset_to_defaults(None), |a| a.silent())
    }

    #[test]
    fn test_reset_to_defaults_reaches_nested_fields() {
        scenario().run().unwrap();
    }
}

mod merge_scenario {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("merge", |recorder| {
            GetSet::builder(Schema::new().nested("author", author(None)?))
                .observer(recorder.clone())
                .build()
        })
        .step(
            "merge_object",
            |gs| gs.set("author", fields! { "name" => "Ada", "email" => "ada@example.com" }),
            |a| {
                a.changed(2)
                    .change("author.name")
                    .change("author.email")
                    .value("author.email", "ada@example.com")
            },
        )
        .step(
            "partial_failure_keeps_earlier_fields",
            |gs| gs.set("author", fields! { "name" => "Grace", "email" => 42 }),
            |a| {
                a.error("Property 'email' should be of type 'String|Null', but got 'Number'")
                    .changed(1)
                    .value("author.name", "Grace")
                    .value("author.email", "ada@example.com")
            },
        )
        .step(
            "replace_container",
            |gs| gs.set("author", "someone"),
            |a| a.error("Cannot set property 'author'. It is read-only").silent(),
        )
        .step(
            "undeclared_nested_field",
            |gs| gs.set("author", fields! { "age" => 3 }),
            |a| a.error("Cannot set property 'age'. Entry was not defined"),
        )
        .step(
            "default_marker_resets_container",
            |gs| gs.set("author", Value::DefaultValue),
            |a| a.changed(2).value("author.name", "").value("author.email", Value::Null),
        )
    }

    #[test]
    fn test_structural_merge_into_nested_container() {
        scenario().run().unwrap();
    }
}

#[test]
fn test_two_level_bubbling_notifies_each_level_once() {
    // GIVEN parent.child.leaf with a recorder at each level
    let child_log = Recorder::new();
    let parent_log = Recorder::new();
    let child = GetSet::builder(Schema::new().field("leaf", FieldDef::new()))
        .observer(child_log.clone())
        .build()
        .unwrap();
    let parent = GetSet::builder(Schema::new().nested("child", child))
        .observer(parent_log.clone())
        .build()
        .unwrap();

    // WHEN
    parent.set_path("child.leaf", 7).unwrap();

    // THEN
    assert_eq!(child_log.changed_names(), vec!["leaf"]);
    assert_eq!(parent_log.changed_names(), vec!["child.leaf"]);
    let change = &parent_log.changes()[0];
    assert_eq!(change.old_value, Value::Null);
    assert_eq!(change.new_value, Value::Int(7));
}

#[test]
fn test_three_level_paths_accumulate() {
    let log = Recorder::new();
    let leaf = GetSet::builder(Schema::new().field("value", FieldDef::new().with_type("Number")))
        .options(Options::observing())
        .observer(log.clone())
        .build()
        .unwrap();
    let middle = GetSet::builder(Schema::new().nested("leaf", leaf.clone()))
        .observer(log.clone())
        .build()
        .unwrap();
    let root = GetSet::builder(Schema::new().nested("middle", middle))
        .observer(log.clone())
        .build()
        .unwrap();

    root.set_path("middle.leaf.value", 1).unwrap();
    root.set_path("middle.leaf.value", "one").unwrap();

    assert_eq!(log.changed_names(), vec!["value", "leaf.value", "middle.leaf.value"]);
    assert_eq!(log.rejected_names(), vec!["value", "leaf.value", "middle.leaf.value"]);
    assert_eq!(leaf.parent_path().as_deref(), Some("middle.leaf"));
    assert!(root.parent_path().is_none());
}

#[test]
fn test_child_outlives_dropped_parent() {
    let log = Recorder::new();
    let child = author(Some(&log)).unwrap();
    let parent = GetSet::new(Schema::new().nested("author", child.clone())).unwrap();
    assert!(child.parent().map_or(false, |p| p.ptr_eq(&parent)));

    drop(parent);

    assert!(child.parent().is_none());
    child.set("name", "Orphan").unwrap();
    assert_eq!(log.changed_names(), vec!["name"]);
}

#[test]
fn test_plain_projection_expands_nested_containers() {
    let post = GetSet::new(
        Schema::new()
            .field("title", FieldDef::new().with_default("Hello"))
            .nested("author", author(None).unwrap()),
    )
    .unwrap();

    assert_eq!(
        post.to_plain_object(None).unwrap(),
        fields! {
            "title" => "Hello",
            "author" => fields! { "name" => "", "email" => Value::Null },
        }
    );
    assert_eq!(
        post.to_plain_object(Some(&["author"])).unwrap(),
        fields! { "author" => fields! { "name" => "", "email" => Value::Null } }
    );
}
