//! Rule table rendering for debugging.

use crate::grammar::Grammar;
use std::fmt;

const HEADER: [&str; 4] = ["#", "Symbol", "Produces", "Using"];
const HORIZONTAL: char = '─';
const VERTICAL: &str = " │ ";

impl<O> Grammar<O> {
    /// Print the rule table to standard output.
    pub fn display(&self) {
        print!("{self}");
    }

    fn grid(&self) -> Vec<[String; 4]> {
        let header = HEADER.map(str::to_string);
        let body = self.rules().iter().enumerate().map(|(id, rule)| {
            let produces = if rule.rhs.is_empty() {
                "ε".to_string()
            } else {
                rule.rhs
                    .iter()
                    .map(|symbol| symbol.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            [
                id.to_string(),
                rule.lhs.to_string(),
                produces,
                rule.attribute.to_string(),
            ]
        });
        std::iter::once(header).chain(body).collect()
    }
}

/// A box-drawn table with one row per rule, divided after the header and then
/// after every fifth rule. Cells are right-aligned.
impl<O> fmt::Display for Grammar<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.grid();
        let mut widths = [0usize; 4];
        for row in &grid {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        rule_line(f, &widths, '┬')?;
        for (r, row) in grid.iter().enumerate() {
            if r % 5 == 1 {
                rule_line(f, &widths, '┼')?;
            }
            for (column, (cell, &width)) in row.iter().zip(&widths).enumerate() {
                if column > 0 {
                    f.write_str(VERTICAL)?;
                }
                let pad = width - cell.chars().count();
                write!(f, "{:pad$}{cell}", "")?;
            }
            writeln!(f)?;
        }
        rule_line(f, &widths, '┴')
    }
}

fn rule_line(f: &mut fmt::Formatter<'_>, widths: &[usize], joint: char) -> fmt::Result {
    for (column, &width) in widths.iter().enumerate() {
        if column > 0 {
            write!(f, "{HORIZONTAL}{joint}{HORIZONTAL}")?;
        }
        for _ in 0..width {
            write!(f, "{HORIZONTAL}")?;
        }
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use crate::grammar::{Attribute, Grammar};

    #[test]
    fn test_empty_grammar_renders_header() {
        let g: Grammar = Grammar::new();
        let rendered = g.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "# │ Symbol │ Produces │ Using");
        assert!(lines[0].contains('┬'));
        assert!(lines[2].contains('┴'));
    }

    #[test]
    fn test_rows_are_right_aligned() {
        let mut g: Grammar = Grammar::new();
        g.declare_rule("Expr", ["Expr", "+", "Term"], None, Attribute::construct("add", [0, 2]), ())
            .unwrap();
        g.declare_rule("Opt", Vec::<&str>::new(), None, Attribute::construct("none", []), ())
            .unwrap();
        let rendered = g.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[3], "0 │   Expr │ Expr + Term │ add($0, $2)");
        assert_eq!(lines[4], "1 │    Opt │           ε │      none()");
    }

    #[test]
    fn test_divider_every_five_rules() {
        let mut g: Grammar = Grammar::new();
        for i in 0..7 {
            g.declare_rule("S", [format!("t{i}")], None, Attribute::rename(0), ())
                .unwrap();
        }
        let rendered = g.to_string();
        let dividers = rendered.lines().filter(|line| line.contains('┼')).count();
        // after the header and after the fifth rule
        assert_eq!(dividers, 2);
        assert_eq!(rendered.lines().count(), 12);
    }
}
