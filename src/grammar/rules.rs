//! Rule lines
//!
//! A rule line reads `[left <] source [> right] [: guard] -> production`. Parsing first cuts
//! the line into its five sections with a single character scan, then compiles each one:
//! the source fixes the module id and names the parameters, the contexts become one
//! [`ContextCondition`], every comma separated guard piece becomes a [`ParamCondition`] and
//! the production becomes module factories.

use once_cell::sync::Lazy;
use regex::Regex;

use super::modules::ModuleParser;
use super::names::ModuleNames;
use super::occurrences::{find_top_level, split_top_level, strip_whitespace};
use super::GrammarError;
use crate::engine::{ContextCondition, ModuleId, ParamCondition, Rule};
use crate::error::LsysError;
use crate::expression::{Comparator, ExpressionCompiler, Operators, Scalar};

/// Parameter names are plain words the tokenizer reads as a single token
static PARAMETER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{Alphabetic}_][\p{Alphabetic}\p{N}_]*$").unwrap());

/// Raw text of the five parts of a rule; absent or empty parts are `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSections {
    pub left: Option<String>,
    pub source: Option<String>,
    pub right: Option<String>,
    pub guard: Option<String>,
    pub production: Option<String>,
}

impl RuleSections {
    pub fn into_array(self) -> [Option<String>; 5] {
        [
            self.left,
            self.source,
            self.right,
            self.guard,
            self.production,
        ]
    }
}

fn section(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

pub struct RuleParser<'a, T> {
    operators: &'a Operators<T>,
    names: &'a mut ModuleNames,
}

impl<'a, T: Scalar> RuleParser<'a, T> {
    pub fn new(operators: &'a Operators<T>, names: &'a mut ModuleNames) -> Self {
        Self { operators, names }
    }

    /// Cut a whitespace-free rule line into its sections
    ///
    /// After `:` only the arrow is structural, so guards may use `<` and `>`. A second `:`
    /// or a repeated context marker is an error.
    pub fn subdivide(line: &str) -> Result<RuleSections, GrammarError> {
        let unexpected = |marker, position| GrammarError::UnexpectedMarker {
            text: line.to_string(),
            marker,
            position,
        };

        let mut sections = RuleSections::default();
        let mut start = 0;
        let (mut seen_left, mut seen_right, mut seen_colon) = (false, false, false);

        for (i, c) in line.char_indices() {
            if c == '-' && line[i + 1..].starts_with('>') {
                let before = section(&line[start..i]);
                if seen_colon {
                    sections.guard = before;
                } else if seen_right {
                    sections.right = before;
                } else {
                    sections.source = before;
                }
                sections.production = section(&line[i + 2..]);
                return Ok(sections);
            }

            match c {
                ':' if seen_colon => return Err(unexpected(':', i)),
                ':' => {
                    let before = section(&line[start..i]);
                    if seen_right {
                        sections.right = before;
                    } else {
                        sections.source = before;
                    }
                    seen_colon = true;
                    start = i + 1;
                }
                _ if seen_colon => {}
                '<' => {
                    if seen_left || seen_right {
                        return Err(unexpected('<', i));
                    }
                    sections.left = section(&line[start..i]);
                    seen_left = true;
                    start = i + 1;
                }
                '>' => {
                    if seen_right {
                        return Err(unexpected('>', i));
                    }
                    sections.source = section(&line[start..i]);
                    seen_right = true;
                    start = i + 1;
                }
                _ => {}
            }
        }

        Err(GrammarError::MissingArrow {
            text: line.to_string(),
        })
    }

    /// Compile one rule line
    pub fn parse(&mut self, line: &str) -> Result<Rule<T>, LsysError> {
        let text = strip_whitespace(line);
        let sections = Self::subdivide(&text)?;

        let source = sections
            .source
            .as_deref()
            .ok_or_else(|| GrammarError::MissingSource { text: text.clone() })?;
        let production = sections
            .production
            .as_deref()
            .ok_or_else(|| GrammarError::MissingProduction { text: text.clone() })?;

        let (source_id, parameters) = self.parse_source(source)?;
        let compiler = self.operators.compiler(&parameters)?;

        let mut context = Vec::new();
        if sections.left.is_some() || sections.right.is_some() {
            let left = self.parse_context(sections.left.as_deref())?;
            let right = self.parse_context(sections.right.as_deref())?;
            context.push(ContextCondition::new(source_id, left, right));
        }

        let conditions = match sections.guard.as_deref() {
            Some(guard) => split_top_level(guard, ',')
                .into_iter()
                .map(|piece| Self::parse_condition(piece, &compiler))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let productions =
            ModuleParser::new(&mut *self.names).parse_module_factories(production, &compiler)?;

        Ok(Rule::new(source_id, context, conditions, productions))
    }

    /// Id and parameter names of the source module
    pub fn parse_source(&mut self, source: &str) -> Result<(ModuleId, Vec<String>), LsysError> {
        let occurrences = ModuleParser::separate(source)?;
        let [occurrence] = occurrences.as_slice() else {
            return Err(GrammarError::InvalidSource {
                text: source.to_string(),
                reason: "the source must be exactly one module",
            }
            .into());
        };

        let parameters = occurrence
            .parameter_pieces()
            .into_iter()
            .map(|name| {
                if PARAMETER_NAME.is_match(name) {
                    Ok(name.to_string())
                } else {
                    Err(GrammarError::InvalidParameterName {
                        name: name.to_string(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let id = self.names.resolve(&occurrence.name)?;
        Ok((id, parameters))
    }

    fn parse_context(&mut self, text: Option<&str>) -> Result<Vec<ModuleId>, LsysError> {
        let Some(text) = text else {
            return Ok(Vec::new());
        };

        let mut ids = Vec::new();
        for occurrence in ModuleParser::separate(text)? {
            if occurrence.parameters.is_some() {
                return Err(GrammarError::ContextParameters {
                    module: occurrence.name,
                }
                .into());
            }
            ids.push(self.names.resolve(&occurrence.name)?);
        }
        Ok(ids)
    }

    /// Compile one guard comparison such as `x+1<=y`
    pub fn parse_condition(
        condition: &str,
        compiler: &ExpressionCompiler<T>,
    ) -> Result<ParamCondition<T>, LsysError> {
        let invalid = |reason| GrammarError::InvalidCondition {
            condition: condition.to_string(),
            reason,
        };

        if condition.is_empty() {
            return Err(invalid("empty condition").into());
        }

        for comparator in Comparator::PRECEDENCE {
            let symbol = comparator.symbol();
            match find_top_level(condition, symbol).as_slice() {
                [] => continue,
                [position] => {
                    let left = &condition[..*position];
                    let right = &condition[position + symbol.len()..];
                    let stray = |side: &str| side.contains(|c: char| matches!(c, '<' | '>' | '='));
                    if stray(left) || stray(right) {
                        return Err(invalid("a condition compares exactly two expressions").into());
                    }
                    return Ok(ParamCondition::new(
                        compiler.parse(left)?,
                        comparator,
                        compiler.parse(right)?,
                    ));
                }
                _ => return Err(invalid("the comparator appears more than once").into()),
            }
        }

        Err(invalid("no comparator").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Generation, GenerationIndex, Module};
    use rstest::rstest;

    fn sections(line: &str) -> [Option<String>; 5] {
        RuleParser::<i64>::subdivide(line).unwrap().into_array()
    }

    fn some(text: &str) -> Option<String> {
        Some(text.to_string())
    }

    #[test]
    fn test_subdivide_plain_rule() {
        assert_eq!(sections("X->X"), [None, some("X"), None, None, some("X")]);
    }

    #[test]
    fn test_subdivide_guarded_rule() {
        assert_eq!(
            sections("X(y):y>0->Y"),
            [None, some("X(y)"), None, some("y>0"), some("Y")]
        );
    }

    #[test]
    fn test_subdivide_full_rule() {
        assert_eq!(
            sections("A<X(y)>B:y<1->C"),
            [some("A"), some("X(y)"), some("B"), some("y<1"), some("C")]
        );
    }

    #[test]
    fn test_subdivide_right_context_only() {
        assert_eq!(
            sections("X>B->C"),
            [None, some("X"), some("B"), None, some("C")]
        );
    }

    #[test]
    fn test_subdivide_errors() {
        assert!(matches!(
            RuleParser::<i64>::subdivide("AB"),
            Err(GrammarError::MissingArrow { .. })
        ));
        assert!(matches!(
            RuleParser::<i64>::subdivide("A<B<X->Y"),
            Err(GrammarError::UnexpectedMarker { marker: '<', .. })
        ));
        assert!(matches!(
            RuleParser::<i64>::subdivide("X(y):y>0:y<2->Y"),
            Err(GrammarError::UnexpectedMarker { marker: ':', .. })
        ));
    }

    #[test]
    fn test_source_parameters() {
        let ops = Operators::<i64>::integer();
        let mut names = ModuleNames::new();
        let mut parser = RuleParser::new(&ops, &mut names);
        let (_, params) = parser.parse_source("A(x,y,z)").unwrap();
        assert_eq!(params, vec!["x", "y", "z"]);
        let (_, params) = parser.parse_source("Module(param1,param2)").unwrap();
        assert_eq!(params, vec!["param1", "param2"]);
        let (a, _) = parser.parse_source("A").unwrap();
        let (aa, _) = parser.parse_source("Aa").unwrap();
        assert_ne!(a, aa);
        let (_, params) = parser.parse_source("F(α,β2)").unwrap();
        assert_eq!(params, vec!["α", "β2"]);
    }

    #[rstest]
    #[case("Module(param)Module")]
    #[case("Module(param)(param)")]
    #[case("A(x+1)")]
    #[case("A(1)")]
    #[case("A(x y)")]
    fn test_invalid_sources(#[case] source: &str) {
        let ops = Operators::<i64>::integer();
        let mut names = ModuleNames::new();
        assert!(RuleParser::new(&ops, &mut names).parse_source(source).is_err());
    }

    #[rstest]
    #[case("1<2", true)]
    #[case("1>2", false)]
    #[case("1=1", true)]
    #[case("1<=1", true)]
    #[case("1>=2", false)]
    #[case("1!=2", true)]
    #[case("1!=1", false)]
    #[case("1<=2", true)]
    #[case("1<=-1", false)]
    fn test_constant_conditions(#[case] condition: &str, #[case] expected: bool) {
        let compiler = Operators::<i64>::integer().compiler::<&str>(&[]).unwrap();
        let condition = RuleParser::parse_condition(condition, &compiler).unwrap();
        assert_eq!(condition.holds(&[]), Ok(expected));
    }

    #[rstest]
    #[case("x<2", vec![1], true)]
    #[case("x<2", vec![10], false)]
    #[case("x+y<25-y", vec![10, 15], false)]
    #[case("(x+5)*y<2*5", vec![2, 3], false)]
    #[case("x+x>=x*x", vec![1], true)]
    fn test_variable_conditions(
        #[case] condition: &str,
        #[case] values: Vec<i64>,
        #[case] expected: bool,
    ) {
        let compiler = Operators::integer().compiler(&["x", "y"]).unwrap();
        let condition = RuleParser::parse_condition(condition, &compiler).unwrap();
        let mut parameters = values;
        parameters.resize(2, 0);
        assert_eq!(condition.holds(&parameters), Ok(expected));
    }

    #[rstest]
    #[case("x")]
    #[case("x==1")]
    #[case("x<1<2")]
    #[case("x<=1>0")]
    #[case("")]
    fn test_invalid_conditions(#[case] condition: &str) {
        let compiler = Operators::integer().compiler(&["x"]).unwrap();
        assert!(matches!(
            RuleParser::parse_condition(condition, &compiler),
            Err(LsysError::Grammar(GrammarError::InvalidCondition { .. }))
        ));
    }

    #[test]
    fn test_guard_commas_inside_brackets_do_not_split() {
        let ops = Operators::integer().with_function(
            crate::expression::Function::new("count", |args: &[i64]| Ok(args.len() as i64))
                .unwrap(),
        );
        let mut names = ModuleNames::new();
        let rule = RuleParser::new(&ops, &mut names)
            .parse("A(x):count(x,x,x)>x,x>0->B")
            .unwrap();
        assert_eq!(rule.conditions().len(), 2);
        assert_eq!(rule.conditions()[0].holds(&[2]), Ok(true));
        assert_eq!(rule.conditions()[1].holds(&[0]), Ok(false));
    }

    #[test]
    fn test_context_parameters_are_rejected() {
        let ops = Operators::<i64>::integer();
        let mut names = ModuleNames::new();
        let result = RuleParser::new(&ops, &mut names).parse("A(x)<X->Y");
        assert_eq!(
            result.unwrap_err(),
            LsysError::Grammar(GrammarError::ContextParameters {
                module: "A".to_string()
            })
        );
    }

    #[test]
    fn test_missing_sections() {
        let ops = Operators::<i64>::integer();
        let mut names = ModuleNames::new();
        let mut parser = RuleParser::new(&ops, &mut names);
        assert!(matches!(
            parser.parse("->X"),
            Err(LsysError::Grammar(GrammarError::MissingSource { .. }))
        ));
        assert!(matches!(
            parser.parse("X->"),
            Err(LsysError::Grammar(GrammarError::MissingProduction { .. }))
        ));
    }

    #[test]
    fn test_parsed_rule_applies() {
        let ops = Operators::<i64>::integer();
        let mut names = ModuleNames::new();
        let rule = RuleParser::new(&ops, &mut names)
            .parse("A < X(y) > B : y < 1 -> C(y + 1)")
            .unwrap();

        let ids = |name: &str| names.id_of(name).unwrap();
        let generation = Generation::axiom(vec![
            Module::bare(ids("A")),
            Module::new(ids("X"), vec![0]),
            Module::bare(ids("B")),
        ]);
        let index = GenerationIndex::new(&generation, 1).unwrap();
        assert_eq!(rule.can_apply(&index), Ok(true));
        assert_eq!(
            rule.apply(index.module()),
            Ok(vec![Module::new(ids("C"), vec![1])])
        );
    }

    #[test]
    fn test_spaced_prefix_operators_keep_their_meaning() {
        let ops = Operators::<i64>::integer();
        let mut names = ModuleNames::new();
        let rule = RuleParser::new(&ops, &mut names)
            .parse("A(x) : x - -1 > 3 -> B(x - -1)")
            .unwrap();

        let a = Module::new(names.id_of("A").unwrap(), vec![3]);
        let generation = Generation::axiom(vec![a.clone()]);
        let index = GenerationIndex::new(&generation, 0).unwrap();
        assert_eq!(rule.can_apply(&index), Ok(true));
        assert_eq!(
            rule.apply(&a),
            Ok(vec![Module::new(names.id_of("B").unwrap(), vec![4])])
        );
    }

    #[test]
    fn test_duplicate_parameter_names() {
        let ops = Operators::<i64>::integer();
        let mut names = ModuleNames::new();
        assert!(matches!(
            RuleParser::new(&ops, &mut names).parse("A(x,x)->B"),
            Err(LsysError::Identifier(_))
        ));
    }
}
