use super::*;

#[test]
fn starts_with_setosa_sample() {
    let editor = FeatureEditor::new();
    assert_eq!(editor.entries(), ["5.1", "3.5", "1.4", "0.2"]);
    assert_eq!(editor.to_vector(), vec![5.1, 3.5, 1.4, 0.2]);
}

#[test]
fn append_edit_and_remove_keep_order() {
    let mut editor = FeatureEditor::new();
    editor.push();
    assert_eq!(editor.len(), 5);
    assert_eq!(editor.entries()[4], "0.0");

    assert!(editor.set(4, "9.9"));
    assert!(!editor.set(10, "1.0"));
    assert_eq!(editor.remove(1), Some("3.5".to_string()));
    assert_eq!(editor.entries(), ["5.1", "1.4", "0.2", "9.9"]);
    assert_eq!(editor.remove(42), None);
}

#[test]
fn last_entry_cannot_be_removed() {
    let mut editor = FeatureEditor::new();
    while editor.len() > 1 {
        editor.remove(0).expect("remove");
    }
    assert_eq!(editor.remove(0), None);
    assert_eq!(editor.len(), 1);
    assert!(!editor.is_empty());
}

#[test]
fn non_numeric_entries_become_nan() {
    let mut editor = FeatureEditor::new();
    editor.set(0, "abc");
    editor.set(1, "");
    editor.set(2, " 2.5 ");

    let vector = editor.to_vector();
    assert_eq!(vector.len(), 4);
    assert!(vector[0].is_nan());
    assert!(vector[1].is_nan());
    assert_eq!(vector[2], 2.5);
    assert_eq!(vector[3], 0.2);
}

#[test]
fn loads_reference_samples() {
    let mut editor = FeatureEditor::new();
    editor.load_sample(IrisSample::parse("Virginica").expect("sample"));
    assert_eq!(editor.to_vector(), vec![6.7, 3.1, 5.6, 2.4]);
    assert_eq!(IrisSample::parse("rose"), None);
}

#[test]
fn labels_iris_positions_then_generic_names() {
    assert_eq!(FeatureEditor::label(0), "Sepal Length (cm)");
    assert_eq!(FeatureEditor::label(3), "Petal Width (cm)");
    assert_eq!(FeatureEditor::label(4), "Feature 5");
}
