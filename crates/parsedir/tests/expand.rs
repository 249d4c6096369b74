use parsedir::app::markers::detect_markers;
use parsedir::domain::errors::ExpandError;
use parsedir::{Context, FileUnit, MissingVariablePolicy, RenderedUnit, expand};
use serde_json::json;

fn context() -> Context {
    Context::new(json!({
        "dog": {"name": "buddy"},
        "pets": [{"name": "rex"}, {"name": "fido"}],
        "teams": [
            {"name": "core", "members": ["ana", "bo"]},
            {"name": "empty", "members": []},
            {"name": "web", "members": ["cy"]},
        ],
    }))
}

#[test]
fn ranged_directory_expands_once_per_element() {
    let files = vec![FileUnit::new(
        "{% for pet in pets %}{{ pet.name }}/detail.txt",
        "Hello {{ pet.name }}",
    )];
    let out = expand(&files, &context(), MissingVariablePolicy::Warn).unwrap();
    assert_eq!(
        out.units,
        vec![
            RenderedUnit::new("rex/detail.txt", "Hello rex"),
            RenderedUnit::new("fido/detail.txt", "Hello fido"),
        ]
    );
    assert!(out.report.alignment_faults.is_empty());
}

#[test]
fn plain_paths_render_by_substitution() {
    let files = vec![FileUnit::new("{{ dog.name }}.yaml", "name: {{ dog.name }}")];
    let out = expand(&files, &context(), MissingVariablePolicy::Warn).unwrap();
    assert_eq!(out.units, vec![RenderedUnit::new("buddy.yaml", "name: buddy")]);
}

#[test]
fn nested_markers_follow_path_order() {
    let files = vec![FileUnit::new(
        "{% for team in teams %}{{ team.name }}/{% for m in team.members %}{{ m }}.txt",
        "{{ m }} works on {{ team.name }}\n",
    )];
    let out = expand(&files, &context(), MissingVariablePolicy::Warn).unwrap();
    assert_eq!(
        out.units,
        vec![
            RenderedUnit::new("core/ana.txt", "ana works on core"),
            RenderedUnit::new("core/bo.txt", "bo works on core"),
            RenderedUnit::new("web/cy.txt", "cy works on web"),
        ]
    );
}

#[test]
fn content_can_loop_on_its_own() {
    let files = vec![FileUnit::new(
        "pets.txt",
        "{% for pet in pets %}- {{ pet.name }}\n{% endfor %}",
    )];
    let out = expand(&files, &context(), MissingVariablePolicy::Warn).unwrap();
    assert_eq!(out.units, vec![RenderedUnit::new("pets.txt", "- rex\n- fido")]);
}

#[test]
fn empty_collections_produce_no_files() {
    let files = vec![FileUnit::new(
        "{% for x in nothing %}{{ x }}.txt",
        "{{ x }}",
    )];
    let ctx = Context::new(json!({"nothing": []}));
    let out = expand(&files, &ctx, MissingVariablePolicy::Error).unwrap();
    assert!(out.units.is_empty());
}

#[test]
fn output_preserves_input_order() {
    let files = vec![
        FileUnit::new("{{ dog.name }}.txt", "dog"),
        FileUnit::new("{% for pet in pets %}{{ pet.name }}.txt", "pet"),
        FileUnit::new("last.txt", "end"),
    ];
    let out = expand(&files, &context(), MissingVariablePolicy::Warn).unwrap();
    let paths: Vec<_> = out.units.iter().map(|u| u.path.as_str()).collect();
    assert_eq!(paths, vec!["buddy.txt", "rex.txt", "fido.txt", "last.txt"]);
}

#[test]
fn expansion_is_repeatable() {
    let files = vec![FileUnit::new(
        "{% for pet in pets %}{{ pet.name }}/detail.txt",
        "Hello {{ pet.name }}",
    )];
    let first = expand(&files, &context(), MissingVariablePolicy::Warn).unwrap();
    let second = expand(&files, &context(), MissingVariablePolicy::Warn).unwrap();
    assert_eq!(first, second);
}

#[test]
fn all_empty_pairs_are_dropped() {
    let files = vec![FileUnit::new(
        "{% for pet in pets %}{% if pet.name == 'rex' %}{{ pet.name }}.txt{% endif %}",
        "{% if pet.name == 'rex' %}good dog{% endif %}",
    )];
    let out = expand(&files, &context(), MissingVariablePolicy::Warn).unwrap();
    assert_eq!(out.units, vec![RenderedUnit::new("rex.txt", "good dog")]);
}

#[test]
fn warn_policy_skips_failing_files_and_continues() {
    let files = vec![
        FileUnit::new("{{ cat.name }}.yaml", "name: {{ cat.name }}"),
        FileUnit::new("{{ dog.name }}.yaml", "name: {{ dog.name }}"),
    ];
    let out = expand(&files, &context(), MissingVariablePolicy::Warn).unwrap();
    assert_eq!(out.units, vec![RenderedUnit::new("buddy.yaml", "name: buddy")]);
    assert_eq!(out.report.skipped.len(), 1);
    assert_eq!(out.report.skipped[0].path, "{{ cat.name }}.yaml");
}

#[test]
fn error_policy_aborts_the_run() {
    let files = vec![
        FileUnit::new("{{ dog.name }}.yaml", "name: {{ dog.name }}"),
        FileUnit::new("{{ cat.name }}.yaml", "name: {{ cat.name }}"),
    ];
    let err = expand(&files, &context(), MissingVariablePolicy::Error).unwrap_err();
    match err {
        ExpandError::Template { path, .. } => assert_eq!(path, "{{ cat.name }}.yaml"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn iterating_a_number_is_a_render_failure() {
    let files = vec![FileUnit::new("{% for p in count %}{{ p }}.txt", "x")];
    let ctx = Context::new(json!({"count": 3}));
    let out = expand(&files, &ctx, MissingVariablePolicy::Off).unwrap();
    assert!(out.units.is_empty());
    assert_eq!(out.report.skipped.len(), 1);
}

#[test]
fn malformed_directives_stay_in_the_bare_path() {
    let scan = detect_markers("{% for p in pets if p.name %}{{ p.name }}.txt");
    assert!(scan.markers.is_empty());

    let files = vec![FileUnit::new(
        "{% for p in pets if p.name %}{{ p.name }}.txt",
        "x",
    )];
    let out = expand(&files, &context(), MissingVariablePolicy::Warn).unwrap();
    assert!(out.units.is_empty());
    assert_eq!(out.report.skipped.len(), 1);
}

#[test]
fn trailing_whitespace_control_in_content_keeps_files_apart() {
    let files = vec![FileUnit::new(
        "{% for pet in pets %}{{ pet.name }}.txt",
        "Hello {{ pet.name -}}\n",
    )];
    let out = expand(&files, &context(), MissingVariablePolicy::Error).unwrap();
    assert_eq!(
        out.units,
        vec![
            RenderedUnit::new("rex.txt", "Hello rex"),
            RenderedUnit::new("fido.txt", "Hello fido"),
        ]
    );
    assert!(out.report.alignment_faults.is_empty());
    assert!(out.report.skipped.is_empty());
}

#[test]
fn trailing_block_whitespace_control_keeps_files_apart() {
    let ctx = Context::new(json!({
        "pets": [{"name": "rex", "good": true}, {"name": "fido", "good": false}],
    }));
    let files = vec![FileUnit::new(
        "{% for pet in pets %}{{ pet.name }}.txt",
        "{{ pet.name }}{% if pet.good %} is good{% endif -%}\n",
    )];
    let out = expand(&files, &ctx, MissingVariablePolicy::Error).unwrap();
    assert_eq!(
        out.units,
        vec![
            RenderedUnit::new("rex.txt", "rex is good"),
            RenderedUnit::new("fido.txt", "fido"),
        ]
    );
    assert!(out.report.alignment_faults.is_empty());
}
