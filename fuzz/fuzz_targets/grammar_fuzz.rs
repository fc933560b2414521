#![no_main]
use attrgram::{Associativity, Attribute, Grammar, ValidationOptions};
use libfuzzer_sys::fuzz_target;

const SYMBOLS: [&str; 8] = ["S", "A", "B", "C", "x", "y", "+", "*"];

fn symbol(byte: u8) -> &'static str {
    SYMBOLS[usize::from(byte) % SYMBOLS.len()]
}

fn associativity(byte: u8) -> Associativity {
    match byte % 4 {
        0 => Associativity::Left,
        1 => Associativity::Right,
        2 => Associativity::NonAssoc,
        _ => Associativity::Bogus,
    }
}

// Every byte chunk is one declaration. Declarations may fail; nothing may panic.
fuzz_target!(|data: &[u8]| {
    let mut grammar: Grammar<usize> = Grammar::new();

    for (i, chunk) in data.chunks(6).enumerate() {
        let [op, lhs, rest @ ..] = chunk else {
            continue;
        };
        match op % 4 {
            0 => {
                let symbols: Vec<&str> = rest.iter().take(2).map(|&b| symbol(b)).collect();
                let _ = grammar.declare_precedence_level(associativity(*lhs), symbols);
            }
            1 => grammar.add_start(symbol(*lhs)),
            _ => {
                let rhs: Vec<&str> = rest.iter().skip(1).map(|&b| symbol(b)).collect();
                let selector = rest.first().copied().unwrap_or(0);
                let attribute = if selector % 2 == 0 {
                    Attribute::rename(usize::from(selector / 2) % 4)
                } else {
                    Attribute::construct("f", rest.iter().map(|&b| usize::from(b % 5)))
                };
                let anchor = (op % 4 == 3).then(|| symbol(selector).into());
                let _ = grammar.declare_rule(symbol(*lhs), rhs, anchor, attribute, i);
            }
        }
    }

    let _ = grammar.augmented_rules();
    let _ = grammar.initial();
    let _ = grammar.apparent_terminals();
    let sets = grammar.find_first_and_epsilon();
    for symbol in SYMBOLS {
        let _ = sets.first_of(symbol);
    }
    for id in 0..=grammar.rule_count() {
        let _ = grammar.rule_precedence(id);
        for lookahead in SYMBOLS {
            let _ = grammar.decide_shift_reduce(lookahead, id);
        }
    }
    let _ = grammar.validate();
    let _ = grammar.validate_with(&ValidationOptions::new().allow_unreachable(true));
    let _ = grammar.assert_no_rename_loops();
    let _ = grammar.assert_no_epsilon_loops_with(&sets);
    let _ = grammar.to_string();
});
