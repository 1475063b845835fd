use super::*;

#[test]
fn test_summed_counts_against_threshold() {
    let text = "New Task New Task Task";
    let keywords = ["task", "new"];

    let result = evaluate(text, &keywords, 5);
    assert_eq!(result.total_occurrences, 5);
    assert!(result.triggered);

    let result = evaluate(text, &keywords, 6);
    assert_eq!(result.total_occurrences, 5);
    assert!(!result.triggered);
}

#[test]
fn test_per_keyword_counts_in_order() {
    let result = evaluate("New Task New Task Task", &["task", "new"], 1);
    assert_eq!(
        result.per_keyword,
        vec![("task".to_string(), 3), ("new".to_string(), 2)]
    );
}

#[test]
fn test_empty_keywords_never_trigger() {
    let empty: [&str; 0] = [];
    for min in [0, 1, 5] {
        let result = evaluate("anything at all", &empty, min);
        assert_eq!(result.total_occurrences, 0);
        assert!(!result.triggered);
    }
}

#[test]
fn test_blank_keywords_ignored() {
    let evaluator = MatchEvaluator::new(&["", "   "], 1);
    assert!(evaluator.is_empty());
    assert!(!evaluator.evaluate("   ").triggered);

    let result = evaluate("task", &["", "task"], 1);
    assert_eq!(result.per_keyword.len(), 1);
    assert!(result.triggered);
}

#[test]
fn test_case_insensitive() {
    let result = evaluate("URGENT urgent UrGeNt", &["Urgent"], 3);
    assert_eq!(result.total_occurrences, 3);
    assert!(result.triggered);
}

#[test]
fn test_metacharacters_are_literal() {
    let text = "We use C++ and c++ daily. Price: $5.00, not $5000.";

    let result = evaluate(text, &["c++"], 1);
    assert_eq!(result.total_occurrences, 2);

    let result = evaluate(text, &["$5.00"], 1);
    assert_eq!(result.total_occurrences, 1);

    let result = evaluate("a.b axb", &["a.b"], 1);
    assert_eq!(result.total_occurrences, 1);

    let result = evaluate("(no) match here", &["(", ".*"], 1);
    assert_eq!(result.total_occurrences, 1);
}

#[test]
fn test_non_overlapping() {
    let result = evaluate("aaaa", &["aa"], 1);
    assert_eq!(result.total_occurrences, 2);
}

#[test]
fn test_zero_min_count_treated_as_one() {
    let evaluator = MatchEvaluator::new(&["task"], 0);
    assert_eq!(evaluator.min_count(), 1);
    assert!(!evaluator.evaluate("nothing here").triggered);
    assert!(evaluator.evaluate("one task").triggered);
}

#[test]
fn test_deterministic_and_idempotent() {
    let evaluator = MatchEvaluator::new(&["task", "new"], 2);
    let text = "new task posted";
    let first = evaluator.evaluate(text);
    let second = evaluator.evaluate(text);
    assert_eq!(first, second);
    assert_eq!(first, evaluate(text, &["task", "new"], 2));
}

#[test]
fn test_from_config_uses_effective_threshold() {
    let config = MonitorConfig {
        keywords: vec!["task".to_string(), " ".to_string()],
        min_match_count: Some(0),
        ..Default::default()
    };
    let evaluator = MatchEvaluator::from_config(&config);
    assert_eq!(evaluator.min_count(), 1);
    assert!(evaluator.evaluate("Task").triggered);
}

#[test]
fn test_unicode_text() {
    let result = evaluate("Новая задача, НОВАЯ задача", &["новая"], 2);
    assert_eq!(result.total_occurrences, 2);
    assert!(result.triggered);
}
