//! Engine scenarios.

use std::sync::Arc;

use super::*;

fn engine(rules: &[Rule]) -> Engine {
    let mut engine = Engine::default();
    engine.compile(rules);
    engine
}

fn rule_ids(results: &[MatchResult]) -> Vec<RuleId> {
    results.iter().map(|r| r.rule_id).collect()
}

#[test]
fn test_literal_rule() {
    let e = engine(&[Rule::new(1).with_input("hello").with_output("hi there")]);

    let best = e.best_match("hello").unwrap();
    assert_eq!(best.rule_id, 1);
    assert_eq!(best.text, "hi there");
    assert_eq!(best.input_index, 0);

    assert!(e.best_match("hello you").is_none());
    assert!(e.best_match("").is_none());
}

#[test]
fn test_wildcard_rule() {
    let e = engine(&[Rule::new(2).with_input("my name is *").with_output("nice to meet you")]);

    let best = e.best_match("my name is Bob").unwrap();
    assert_eq!(best.rule_id, 2);
    assert_eq!(best.text, "nice to meet you");

    // `*` also matches nothing
    assert_eq!(e.best_match("my name is").unwrap().rule_id, 2);
    assert_eq!(e.best_match("my name is Bob Smith Jr").unwrap().rule_id, 2);
    assert!(e.best_match("my name").is_none());
}

#[test]
fn test_empty_rule_set() {
    let e = engine(&[]);
    assert!(e.match_input("hello").is_empty());
    assert!(e.match_input("").is_empty());
}

#[test]
fn test_verbatim_literal_phrases() {
    let phrases = [
        "hello",
        "how are you",
        "how old are you",
        "what is your name",
        "what is the time",
        "good morning",
        "good night",
    ];
    let rules: Vec<Rule> = phrases
        .iter()
        .zip(1..)
        .map(|(p, id)| Rule::new(id).with_input(*p).with_output(&format!("reply {id}")))
        .collect();
    let e = engine(&rules);

    for (phrase, id) in phrases.iter().zip(1..) {
        let best = e.best_match(phrase).unwrap_or_else(|| panic!("no match for {phrase:?}"));
        assert_eq!(best.rule_id, id, "phrase {phrase:?}");
        assert_eq!(best.text, format!("reply {id}"));
    }
}

#[test]
fn test_wildcard_demotion() {
    let e = engine(&[
        Rule::new(1).with_input("hello +").with_output("plus"),
        Rule::new(2).with_input("hello *").with_output("star"),
    ]);

    let tree = e.tree();
    let hello = tree.children(tree.root())[0];
    let wildcards: Vec<NodeId> = tree
        .children(hello)
        .iter()
        .copied()
        .filter(|&c| matches!(tree.node(c).kind(), NodeKind::Wildcard(_)))
        .collect();
    assert_eq!(wildcards.len(), 1);
    assert_eq!(
        *tree.node(wildcards[0]).kind(),
        NodeKind::Wildcard(Quantifier::ZeroOrMore)
    );

    // Zero occurrences are accepted now
    assert_eq!(e.best_match("hello").unwrap().rule_id, 2);
    // Both rules share the wildcard node; the lower key answers first
    assert_eq!(rule_ids(&e.match_input("hello world")), [1]);
}

#[test]
fn test_demotion_adds_bypass_to_existing_children() {
    let e = engine(&[
        Rule::new(1).with_input("hi + bye").with_output("plus"),
        Rule::new(2).with_input("hi * bye").with_output("star"),
    ]);
    assert_eq!(e.best_match("hi bye").unwrap().text, "plus");
    assert_eq!(e.best_match("hi there bye").unwrap().text, "plus");
}

#[test]
fn test_one_or_more_needs_a_word() {
    let e = engine(&[Rule::new(1).with_input("hi +").with_output("ok")]);
    assert!(e.best_match("hi").is_none());
    assert!(e.best_match("hi you").is_some());
    assert!(e.best_match("hi you two").is_some());
}

#[test]
fn test_star_in_the_middle() {
    let e = engine(&[Rule::new(1).with_input("hi * bye").with_output("ok")]);
    assert!(e.best_match("hi bye").is_some());
    assert!(e.best_match("hi there bye").is_some());
    assert!(e.best_match("hi a b c bye").is_some());
    assert!(e.best_match("hi there").is_none());
}

#[test]
fn test_leading_star() {
    let e = engine(&[
        Rule::new(1).with_input("hello").with_output("plain"),
        Rule::new(2).with_input("* hello").with_output("star"),
    ]);
    // Same score: discovery order decides
    assert_eq!(rule_ids(&e.match_input("hello")), [1, 2]);
    assert_eq!(rule_ids(&e.match_input("well hello")), [2]);
}

#[test]
fn test_loop_safety() {
    let e = engine(&[
        Rule::new(1).with_input("[x]").with_output("^[x]"),
        Rule::new(2).with_input("* [y] *").with_output("^[y]"),
        Rule::new(3).with_input("+ + [z]").with_output("^[z] ^[z]"),
    ]);

    // Every rule only refers back to itself
    for input in ["a", "a b", "a b c"] {
        assert!(e.match_input(input).is_empty(), "input {input:?}");
    }
}

#[test]
fn test_self_reference_falls_back_to_other_rules() {
    let e = engine(&[
        Rule::new(1).with_input("[x]").with_output("^[x]"),
        Rule::new(2).with_input("hello").with_output("hi there"),
    ]);

    let results = e.match_input("hello");
    assert_eq!(rule_ids(&results), [2, 1]);
    assert_eq!(results[0].text, "hi there");
    assert_eq!(results[1].text, "hi there");
    assert!(results[0].score > results[1].score);
}

#[test]
fn test_determinism() {
    let e = engine(&[
        Rule::new(1).with_input("hello *").with_output("a"),
        Rule::new(2).with_input("[x] world").with_output("b [x]"),
        Rule::new(3).with_input("hello world").with_output("c"),
        Rule::new(4).with_input("* *").with_output("d"),
    ]);

    let first = e.match_input("hello world");
    let second = e.match_input("hello world");
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    assert_eq!(first[0].rule_id, 3);
}

#[test]
fn test_ranking_stability() {
    let rules = [
        Rule::new(1).with_input("[a] there").with_output("one"),
        Rule::new(2).with_input("[b] there").with_output("two"),
    ];
    let results = engine(&rules).match_input("hi there");
    assert_eq!(results[0].score, results[1].score);
    assert_eq!(rule_ids(&results), [1, 2]);

    // Discovery order, not rule id order
    let reversed = [rules[1].clone(), rules[0].clone()];
    assert_eq!(rule_ids(&engine(&reversed).match_input("hi there")), [2, 1]);
}

#[test]
fn test_recursive_expansion() {
    let e = engine(&[
        Rule::new(1).with_input("hello").with_output("hi there"),
        Rule::new(2)
            .with_input("[name] says [phrase]")
            .with_output("^[phrase], said [name]"),
        Rule::new(3).with_input("call me [name]").with_output("ok [name]"),
    ]);

    let best = e.best_match("Bob says hello").unwrap();
    assert_eq!(best.rule_id, 2);
    assert_eq!(best.text, "hi there, said Bob");

    // The nested match binds its own [name]; the outer one is restored
    let best = e.best_match("Bob says call me Al").unwrap();
    assert_eq!(best.text, "ok Al, said Bob");

    // No nested response: the output fails, and so does the rule
    assert!(e.best_match("Bob says nothing useful").is_none());
}

#[test]
fn test_nested_recursion() {
    let e = engine(&[
        Rule::new(1).with_input("hello").with_output("hi there"),
        Rule::new(2).with_input("repeat [x]").with_output("^[x]!"),
    ]);
    assert_eq!(e.best_match("repeat repeat repeat hello").unwrap().text, "hi there!!!");
}

#[test]
fn test_conditional_outputs() {
    let e = engine(&[Rule::new(1)
        .with_input("my name is [name]")
        .with_conditional_output("hi Bob, old friend", Condition::parse("[name] = bob").unwrap())
        .with_output("nice to meet you [name]")]);

    assert_eq!(e.best_match("my name is Bob").unwrap().text, "hi Bob, old friend");
    assert_eq!(e.best_match("my name is Al").unwrap().text, "nice to meet you Al");
}

#[test]
fn test_no_applicable_output() {
    let e = engine(&[Rule::new(1)
        .with_input("my name is [name]")
        .with_conditional_output("hi Bob", Condition::parse("[name] = bob").unwrap())]);
    assert!(e.best_match("my name is Al").is_none());
}

#[test]
fn test_failed_expansion_tries_next_key() {
    let e = engine(&[
        Rule::new(1).with_input("tell me *").with_output("^[nothing]"),
        Rule::new(2).with_input("tell me *").with_output("I don't know"),
    ]);
    let results = e.match_input("tell me stuff");
    assert_eq!(rule_ids(&results), [2]);
    assert_eq!(results[0].text, "I don't know");
}

#[test]
fn test_only_first_applicable_output_is_tried() {
    let e = engine(&[Rule::new(1)
        .with_input("tell me [x]")
        .with_output("^[x]")
        .with_output("no idea about [x]")]);
    assert!(e.match_input("tell me stuff").is_empty());

    // A guard that does not hold lets the next output through
    let e = engine(&[Rule::new(1)
        .with_input("tell me [x]")
        .with_conditional_output("^[x]", Condition::parse("[x] = hello").unwrap())
        .with_output("no idea about [x]")]);
    assert_eq!(e.best_match("tell me stuff").unwrap().text, "no idea about stuff");
}

#[test]
fn test_empty_nested_response_fails() {
    let e = engine(&[
        Rule::new(1).with_input("hello").with_output(""),
        Rule::new(2).with_input("say [x]").with_output("<^[x]>"),
    ]);
    assert_eq!(e.best_match("hello").unwrap().text, "");
    assert!(e.match_input("say hello").is_empty());
}

#[test]
fn test_unbound_reference_is_empty() {
    let e = engine(&[Rule::new(1).with_input("hello").with_output("hi [who]!")]);
    assert_eq!(e.best_match("hello").unwrap().text, "hi !");
}

#[test]
fn test_multi_word_variable() {
    let e = engine(&[Rule::new(1).with_input("call me [name]").with_output("hi [name]")]);
    assert_eq!(e.best_match("Call me Mary Jane").unwrap().text, "hi Mary Jane");
}

#[test]
fn test_input_index() {
    let e = engine(&[Rule::new(9)
        .with_input("hi")
        .with_input("good morning")
        .with_output("hello")]);
    let best = e.best_match("good morning").unwrap();
    assert_eq!((best.rule_id, best.input_index), (9, 1));
}

#[test]
fn test_symbols_ignored() {
    let e = engine(&[Rule::new(1).with_input("hello").with_output("hi")]);
    assert!(e.best_match("hello!!!").is_some());
    assert!(e.best_match("... hello?").is_some());
    assert!(e.best_match("?!").is_none());
}

#[test]
fn test_lemmas_and_exact_match() {
    let mut config = EngineConfig::default();
    config.tokenizer.lemmas.insert("running".to_string(), "run".to_string());
    let mut e = Engine::new(config);
    e.compile(&[
        Rule::new(1).with_input("I like running").with_output("me too"),
        Rule::new(2).with_input("I love 'running'").with_output("exactly"),
    ]);

    assert_eq!(e.best_match("i like run").unwrap().rule_id, 1);
    assert_eq!(e.best_match("I like running").unwrap().rule_id, 1);
    assert!(e.best_match("i love run").is_none());
    assert_eq!(e.best_match("I love running").unwrap().rule_id, 2);
}

struct DashTokenizer;

impl Tokenizer for DashTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Word> {
        text.split('-')
            .filter(|s| !s.is_empty())
            .map(|s| {
                let lower = s.to_lowercase();
                Word::new(s, lower.clone(), lower, "")
            })
            .collect()
    }
}

#[test]
fn test_external_tokenizer() {
    let mut e = Engine::with_tokenizer(EngineConfig::default(), Arc::new(DashTokenizer));
    e.compile(&[Rule::new(1).with_input("good-morning").with_output("hello")]);
    assert_eq!(e.best_match("GOOD-MORNING").unwrap().rule_id, 1);
    assert!(e.best_match("good morning").is_none());
}

#[test]
fn test_concurrent_matching() {
    let e = engine(&[
        Rule::new(1).with_input("hello").with_output("hi there"),
        Rule::new(2).with_input("[name] says [phrase]").with_output("^[phrase], said [name]"),
        Rule::new(3).with_input("my name is *").with_output("nice to meet you"),
    ]);
    let inputs = ["hello", "Bob says hello", "my name is Al", "nothing"];
    let expected: Vec<Vec<MatchResult>> = inputs.iter().map(|i| e.match_input(i)).collect();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..50 {
                    for (input, want) in inputs.iter().zip(&expected) {
                        assert_eq!(&e.match_input(input), want);
                    }
                }
            });
        }
    });
}

#[test]
fn test_rules_from_yaml() {
    let yaml = b"
- id: 1
  input: [hello, hi]
  output: [hi there]
- id: 2
  input: ['my name is [name]']
  output:
    - ['hi Bob, old friend', '[name] = bob']
    - 'nice to meet you [name]'
";
    let rules = parse_rules_yaml(yaml).unwrap();
    let e = engine(&rules);

    assert_eq!(e.best_match("hi").unwrap().input_index, 1);
    assert_eq!(e.best_match("my name is bob").unwrap().text, "hi Bob, old friend");
    assert_eq!(e.best_match("my name is Eve").unwrap().text, "nice to meet you Eve");
}
