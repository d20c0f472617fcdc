//! Rule types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::capture::CaptureStack;
use crate::condition::Condition;
use crate::error::{Error, Result};
use crate::template::Template;

/// Stable identifier of a rule.
pub type RuleId = u64;

/// An output template guarded by a condition.
///
/// JSON/YAML supports:
/// - `"hi there"` (always applicable)
/// - `["hi [name]", "[name] != bob"]` (template with condition)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalOutput {
    pub template: Template,
    pub condition: Condition,
}

impl ConditionalOutput {
    /// An output that always applies.
    pub fn new(template: &str) -> Self {
        Self {
            template: Template::parse(template),
            condition: Condition::Always,
        }
    }

    /// An output that applies when `condition` holds.
    pub fn when(template: &str, condition: Condition) -> Self {
        Self {
            template: Template::parse(template),
            condition,
        }
    }

    pub fn applies(&self, captures: &CaptureStack<'_>) -> bool {
        self.condition.holds(captures)
    }
}

impl Serialize for ConditionalOutput {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.condition == Condition::Always {
            serializer.serialize_str(self.template.source())
        } else {
            use serde::ser::SerializeSeq;
            let mut seq = serializer.serialize_seq(Some(2))?;
            seq.serialize_element(self.template.source())?;
            seq.serialize_element(&self.condition)?;
            seq.end()
        }
    }
}

impl<'de> Deserialize<'de> for ConditionalOutput {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, Visitor};

        struct OutputVisitor;

        impl<'de> Visitor<'de> for OutputVisitor {
            type Value = ConditionalOutput;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string or [template, condition] array")
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: Error,
            {
                Ok(ConditionalOutput::new(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let template: String = seq
                    .next_element()?
                    .ok_or_else(|| A::Error::invalid_length(0, &"1 or 2 elements"))?;

                let condition: String = seq.next_element()?.unwrap_or_default();
                let condition = Condition::parse(&condition).map_err(A::Error::custom)?;

                if seq.next_element::<serde::de::IgnoredAny>()?.is_some() {
                    return Err(A::Error::invalid_length(3, &"1 or 2 elements"));
                }

                Ok(ConditionalOutput::when(&template, condition))
            }
        }

        deserializer.deserialize_any(OutputVisitor)
    }
}

/// A rule maps input phrases to conditional outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique id, reported back with every match.
    pub id: RuleId,

    /// Input phrases. May contain `*`, `+`, `[var]` and `'exact'` words.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input: Vec<String>,

    /// Outputs; the first one whose condition holds is used.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output: Vec<ConditionalOutput>,
}

impl Rule {
    /// Create a new rule with the given id.
    pub fn new(id: RuleId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Add an input phrase.
    pub fn with_input(mut self, phrase: impl Into<String>) -> Self {
        self.input.push(phrase.into());
        self
    }

    /// Add an output that always applies.
    pub fn with_output(mut self, template: &str) -> Self {
        self.output.push(ConditionalOutput::new(template));
        self
    }

    /// Add an output guarded by a condition.
    pub fn with_conditional_output(mut self, template: &str, condition: Condition) -> Self {
        self.output.push(ConditionalOutput::when(template, condition));
        self
    }

    /// Parse a rule from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let rule: Self = serde_json::from_slice(data)?;
        rule.validate()?;
        Ok(rule)
    }

    /// Parse a rule from YAML bytes.
    pub fn from_yaml(data: &[u8]) -> Result<Self> {
        let rule: Self = serde_yaml::from_slice(data)?;
        rule.validate()?;
        Ok(rule)
    }

    /// A rule needs at least one input phrase.
    pub fn validate(&self) -> Result<()> {
        if self.input.is_empty() {
            return Err(Error::Validation(format!("rule {} has no input phrases", self.id)));
        }
        if self.input.iter().any(|p| p.contains(['\n', '\r'])) {
            return Err(Error::Validation(format!("rule {}: input contains newline", self.id)));
        }
        Ok(())
    }
}

/// A rule document holds one rule or a list of rules.
#[derive(Deserialize)]
#[serde(untagged)]
enum RuleDoc {
    One(Rule),
    Many(Vec<Rule>),
}

impl RuleDoc {
    fn into_rules(self) -> Result<Vec<Rule>> {
        let rules = match self {
            RuleDoc::One(rule) => vec![rule],
            RuleDoc::Many(rules) => rules,
        };
        for rule in &rules {
            rule.validate()?;
        }
        Ok(rules)
    }
}

/// Parse one rule or a list of rules from JSON bytes.
pub fn parse_rules_json(data: &[u8]) -> Result<Vec<Rule>> {
    serde_json::from_slice::<RuleDoc>(data)?.into_rules()
}

/// Parse one rule or a list of rules from YAML bytes.
pub fn parse_rules_yaml(data: &[u8]) -> Result<Vec<Rule>> {
    serde_yaml::from_slice::<RuleDoc>(data)?.into_rules()
}
