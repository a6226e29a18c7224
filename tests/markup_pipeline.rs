// End-to-end sentence markup through the annotator pipeline
// WHY: Exercises matching, scope narrowing and pruning together on realistic sentences

mod integration;
use integration::fixtures::PE_IMPRESSION;
use integration::{annotator, annotator_with, targets};

use contextmark::{Annotator, AnnotatorConfig, EdgeKind, Lexicon, Rule};

#[test]
fn test_negated_pulmonary_embolism() {
    let modifiers = Lexicon::from_rows([("no gross evidence of", "PROBABLE_NEGATED_EXISTENCE", "", "forward")])
        .expect("Modifier lexicon should build");
    let markup = Annotator::new(targets(), modifiers)
        .markup_sentence(PE_IMPRESSION)
        .expect("Markup should succeed");

    let targets = markup.targets();
    let modifiers = markup.modifiers();
    assert_eq!(targets.len(), 1);
    assert_eq!(modifiers.len(), 1);
    assert_eq!(targets[0].found_text(), "pulmonary embolism");
    assert_eq!(modifiers[0].found_text(), "no gross evidence of");
    assert_eq!(markup.edges(), vec![(modifiers[0].id(), targets[0].id(), EdgeKind::Modifies)]);
}

#[test]
fn test_terminator_limits_negation() {
    let markup = annotator()
        .markup_sentence("No pneumonia but there is edema.")
        .expect("Markup should succeed");

    let targets = markup.targets();
    assert_eq!(targets.len(), 2);
    let (pneumonia, edema) = (targets[0], targets[1]);
    assert_eq!(pneumonia.found_text(), "pneumonia");
    assert_eq!(edema.found_text(), "edema");

    assert!(markup.is_modified_by(pneumonia.id(), "DEFINITE_NEGATED_EXISTENCE"));
    assert!(!markup.is_modified_by(edema.id(), "DEFINITE_NEGATED_EXISTENCE"));

    let modifiers = markup.modifiers();
    let negation = modifiers.iter().find(|m| m.found_text() == "no").expect("negation kept");
    let terminator = modifiers.iter().find(|m| m.rule() == Rule::Terminate).expect("terminator kept");
    assert_eq!(markup.scope(negation.id()).map(|s| s.end), Some(terminator.span().start));
    assert_eq!(markup.edge_kind(negation.id(), terminator.id()), Some(EdgeKind::Terminates));
}

#[test]
fn test_backward_modifier() {
    let markup = annotator()
        .markup_sentence("Pulmonary embolism ruled out.")
        .expect("Markup should succeed");

    let target = markup.targets()[0];
    assert_eq!(target.found_text(), "pulmonary embolism");
    let modified_by: Vec<_> = markup.modified_by(target.id()).iter().map(|m| m.found_text().to_string()).collect();
    assert_eq!(modified_by, vec!["ruled out"]);
}

#[test]
fn test_exclusion_category_removes_marks() {
    let sentence = "Patient has a history of pneumonia.";

    let markup = annotator().markup_sentence(sentence).expect("Markup should succeed");
    let target = markup.targets()[0].id();
    assert!(markup.is_modified_by(target, "historical"));

    let config = AnnotatorConfig {
        exclusion_category: "historical".to_string(),
        ..AnnotatorConfig::default()
    };
    let markup = annotator_with(config).markup_sentence(sentence).expect("Markup should succeed");
    assert!(markup.modifiers().is_empty());
    assert_eq!(markup.targets().len(), 1);
    assert_eq!(markup.edge_count(), 0);
}

#[test]
fn test_modifier_inside_its_target_is_pruned() {
    let config = AnnotatorConfig {
        prune_inactive: false,
        ..AnnotatorConfig::default()
    };
    let markup = annotator_with(config)
        .markup_sentence("There is free air.")
        .expect("Markup should succeed");

    assert_eq!(markup.targets().len(), 1);
    assert_eq!(markup.targets()[0].found_text(), "free air");
    assert!(markup.modifiers().is_empty());
    assert_eq!(markup.edge_count(), 0);
}

#[test]
fn test_keep_closest_relationship() {
    let sentence = "No pneumonia or edema.";

    let markup = annotator().markup_sentence(sentence).expect("Markup should succeed");
    assert_eq!(markup.edge_count(), 2);

    let config = AnnotatorConfig {
        keep_closest: true,
        ..AnnotatorConfig::default()
    };
    let markup = annotator_with(config).markup_sentence(sentence).expect("Markup should succeed");
    let targets = markup.targets();
    assert_eq!(markup.edge_count(), 1);
    assert!(markup.is_modified_by(targets[0].id(), "definite_negated_existence"));
    assert!(markup.modified_by(targets[1].id()).is_empty());
}

#[test]
fn test_strip_non_alnum_and_lowercase() {
    let config = AnnotatorConfig {
        strip_non_alnum: true,
        lowercase: true,
        ..AnnotatorConfig::default()
    };
    let markup = annotator_with(config)
        .markup_sentence("DENIES: pneumonia!")
        .expect("Markup should succeed");

    assert_eq!(markup.raw_text(), "denies: pneumonia!");
    assert_eq!(markup.text(), "denies pneumonia ");
    let target = markup.targets()[0];
    assert!(markup.is_modified_by(target.id(), "definite_negated_existence"));
}

#[test]
fn test_markup_is_deterministic() {
    let sentence = "No pneumonia but there is edema.";
    let first = annotator().markup_sentence(sentence).expect("Markup should succeed");
    let second = annotator().markup_sentence(sentence).expect("Markup should succeed");

    let shape = |m: &contextmark::MarkupGraph| {
        m.edges()
            .into_iter()
            .map(|(a, b, kind)| {
                let a = m.annotation(a).map(|n| n.found_text().to_string());
                let b = m.annotation(b).map(|n| n.found_text().to_string());
                (a, b, kind)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&first), shape(&second));
}
