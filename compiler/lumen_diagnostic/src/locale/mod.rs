//! Message catalogs.
//!
//! Conflicts and exceptions are reported as a key plus ordered arguments.
//! A [`Locale`] maps the key to a template in which `$1`…`$n` stand for
//! the arguments. Keys are stable: `<ConflictKind>.primary`,
//! `<ConflictKind>.secondary` and `Exception.<ExceptionKind>`.

/// A message catalog.
pub trait Locale {
    /// Template for `key`, if the catalog has one.
    fn lookup(&self, key: &str) -> Option<&str>;

    /// Look up `key` and substitute `args`.
    fn render(&self, key: &str, args: &[String]) -> Option<String> {
        self.lookup(key).map(|template| substitute(template, args))
    }
}

/// Replace `$n` (1-based) in `template` with `args[n - 1]`.
///
/// Out-of-range placeholders render as `?`; a `$` not followed by a digit
/// is kept as is.
pub fn substitute(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut end = start + 1;
        while let Some(&(i, d)) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            end = i + d.len_utf8();
            chars.next();
        }
        if end == start + 1 {
            out.push('$');
            continue;
        }
        let index: usize = template[start + 1..end].parse().unwrap_or(0);
        match index.checked_sub(1).and_then(|i| args.get(i)) {
            Some(arg) => out.push_str(arg),
            None => out.push('?'),
        }
    }
    out
}

/// The built-in English catalog used by the command line.
#[derive(Copy, Clone, Debug, Default)]
pub struct English;

const ENGLISH: &[(&str, &str)] = &[
    ("UnknownName.primary", "$1 isn't defined here"),
    ("UnknownTypeName.primary", "there's no structure named $1"),
    ("IncompatibleBind.primary", "expected $1, but this is $2"),
    ("IncompatibleBind.secondary", "this bind expects $1"),
    ("IncompatibleInput.primary", "input $3 expects $1, but this is $2"),
    ("IncompatibleInput.secondary", "$3 is declared here"),
    ("MissingInput.primary", "missing required input $1 ($2)"),
    ("MissingInput.secondary", "$1 has no default"),
    ("UnexpectedInput.primary", "this function takes only $1 inputs"),
    ("UnexpectedInput.secondary", "the function is defined here"),
    ("NotAFunction.primary", "$1 isn't a function"),
    ("DuplicateName.primary", "$1 is already defined in this scope"),
    ("DuplicateName.secondary", "$1 is first defined here"),
    ("CaseCollision.primary", "$1 differs from $2 only by case"),
    ("CaseCollision.secondary", "$2 is defined here"),
    ("ExpectedBooleanCondition.primary", "conditions must be ?, but this is $1"),
    ("IncompatibleOperand.primary", "$1 can't combine $2 and $3"),
    ("IncompatibleOperand.secondary", "this operand is $3"),
    ("IncompatibleUnits.primary", "$3 needs matching units, but these are $1 and $2"),
    ("IncompatibleUnits.secondary", "this operand is in $2"),
    ("UnknownProperty.primary", "$2 has no property $1"),
    ("ExpectedStream.primary", "expected a stream, but this is $1"),
    ("MisplacedThis.primary", ". only means something in a reaction or conversion"),
    ("MissingCell.primary", "this row has no value for column $1"),
    ("MissingCell.secondary", "column $1 has no default"),
    ("ExtraCell.primary", "this table only has $1 columns"),
    ("IncompatibleCell.primary", "column $3 expects $1, but this is $2"),
    ("IncompatibleCell.secondary", "column $3 is declared here"),
    ("ExpectedColumnType.primary", "column $1 needs a type"),
    ("UnknownColumn.primary", "this table has no column named $1"),
    ("NonBooleanQuery.primary", "queries must be ?, but this is $1"),
    ("BorrowCycle.primary", "$1 borrows from this program, which makes a cycle"),
    ("ReferenceCycle.primary", "$1 depends on itself"),
    ("UnknownBorrow.primary", "there's nothing named $1 to borrow"),
    ("ExpectedEndingExpression.primary", "this block needs to end with an expression"),
    ("IgnoredExpression.primary", "this value is never used"),
    ("UnimplementedInterface.primary", "$1 doesn't implement $2"),
    ("UnimplementedInterface.secondary", "$2 is required by this interface"),
    ("IncompatibleOutput.primary", "the function should produce $1, but this is $2"),
    ("IncompatibleOutput.secondary", "the output type is declared here"),
    ("Placeholder.primary", "this placeholder still needs to be written"),
    ("Unparsable.primary", "couldn't make sense of this"),
    ("UnknownConversion.primary", "there's no conversion from $1 to $2"),
    ("RequiredAfterOptional.primary", "required input $1 can't follow optional inputs"),
    ("RequiredAfterOptional.secondary", "this input is optional"),
    ("Exception.UnknownName", "$1 isn't defined"),
    ("Exception.TypeMismatch", "expected $1, but got $2"),
    ("Exception.ArityMismatch", "expected $1 inputs, but got $2"),
    ("Exception.MissingInput", "no value was given for input $1"),
    ("Exception.NotAFunction", "$1 isn't a function"),
    ("Exception.UnknownProperty", "$2 has no property $1"),
    ("Exception.MissingConversion", "there's no conversion from $1 to $2"),
    ("Exception.DivisionByZero", "can't divide by zero"),
    ("Exception.StepLimit", "stopped after $1 steps"),
    ("Exception.CallDepthLimit", "stopped after $1 nested evaluations"),
    ("Exception.Placeholder", "reached a placeholder"),
    ("Exception.Unparsable", "reached code that couldn't be parsed"),
    ("Exception.ValueExpected", "expected a value, but there wasn't one"),
    ("Exception.UnknownStream", "there's no stream named $1"),
];

impl Locale for English {
    fn lookup(&self, key: &str) -> Option<&str> {
        ENGLISH
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, template)| *template)
    }
}

#[cfg(test)]
mod tests;
