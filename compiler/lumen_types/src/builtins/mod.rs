//! Builtin streams, members and conversions.
//!
//! The evaluator implements the same members; both sides look them up
//! through [`BuiltinMember::find`] so the static and runtime views agree.

use crate::ty::{FunctionType, Input, Refine};
use crate::{Type, Unit};

/// Streams available in every program.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Milliseconds since the program started.
    Time,
    /// Names of pressed keys.
    Key,
    /// Pointer position as `[x y]` in pixels.
    Pointer,
    /// Whether the primary button is down.
    Button,
    /// Microphone amplitude.
    Mic,
}

impl StreamKind {
    pub const ALL: [StreamKind; 5] = [
        StreamKind::Time,
        StreamKind::Key,
        StreamKind::Pointer,
        StreamKind::Button,
        StreamKind::Mic,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            StreamKind::Time => "Time",
            StreamKind::Key => "Key",
            StreamKind::Pointer => "Pointer",
            StreamKind::Button => "Button",
            StreamKind::Mic => "Mic",
        }
    }

    pub fn from_name(name: &str) -> Option<StreamKind> {
        StreamKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn item_type(self) -> Type {
        match self {
            StreamKind::Time => Type::Number(Unit::base("ms")),
            StreamKind::Key => Type::Text,
            StreamKind::Pointer => Type::list(Type::Number(Unit::base("px"))),
            StreamKind::Button => Type::Boolean,
            StreamKind::Mic => Type::unitless(),
        }
    }

    /// Type of the stream's name: a function producing the stream.
    pub fn creator_type(self) -> Type {
        Type::Function(FunctionType::new(Vec::new(), Type::stream(self.item_type())))
    }
}

/// Kinds of values that carry builtin members.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Receiver {
    Number,
    Text,
    List,
    Set,
    Map,
    Table,
}

impl Receiver {
    pub fn of(ty: &Type) -> Option<Receiver> {
        Some(match ty {
            Type::Number(_) => Receiver::Number,
            Type::Text => Receiver::Text,
            Type::List(_) => Receiver::List,
            Type::Set(_) => Receiver::Set,
            Type::Map(_, _) => Receiver::Map,
            Type::Table(_) => Receiver::Table,
            _ => return None,
        })
    }
}

macro_rules! members {
    ($( $receiver:ident { $( $name:literal => $member:ident ),* $(,)? } )*) => {
        /// Every builtin member function.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum BuiltinMember {
            $( $( $member, )* )*
        }

        impl BuiltinMember {
            pub fn find(receiver: Receiver, name: &str) -> Option<BuiltinMember> {
                match (receiver, name) {
                    $( $( (Receiver::$receiver, $name) => Some(BuiltinMember::$member), )* )*
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $( $( BuiltinMember::$member => $name, )* )*
                }
            }

            /// Member names of a receiver kind, for completion.
            pub fn names(receiver: Receiver) -> &'static [&'static str] {
                match receiver {
                    $( Receiver::$receiver => &[$( $name, )*], )*
                }
            }
        }
    };
}

members! {
    Number {
        "sqrt" => Sqrt,
        "abs" => Abs,
        "round" => Round,
        "text" => NumberText,
    }
    Text {
        "length" => TextLength,
        "has" => TextHas,
        "repeat" => Repeat,
    }
    List {
        "length" => ListLength,
        "first" => First,
        "last" => Last,
        "get" => Get,
        "reverse" => Reverse,
        "has" => ListHas,
        "add" => ListAdd,
        "translate" => Translate,
        "filter" => Filter,
        "all" => All,
        "find" => Find,
        "until" => Until,
        "combine" => Combine,
    }
    Set {
        "size" => SetSize,
        "has" => SetHas,
        "add" => SetAdd,
        "remove" => SetRemove,
        "list" => SetList,
    }
    Map {
        "size" => MapSize,
        "get" => MapGet,
        "has" => MapHas,
        "set" => MapSet,
        "keys" => Keys,
        "values" => Values,
    }
    Table {
        "size" => TableSize,
    }
}

impl BuiltinMember {
    /// Members that evaluate a function input once per item.
    pub fn is_higher_order(self) -> bool {
        matches!(
            self,
            BuiltinMember::Translate
                | BuiltinMember::Filter
                | BuiltinMember::All
                | BuiltinMember::Find
                | BuiltinMember::Until
                | BuiltinMember::Combine
        )
    }

    /// Signature of this member on a receiver of type `receiver`.
    pub fn signature(self, receiver: &Type) -> FunctionType {
        use BuiltinMember as M;

        let item = match receiver {
            Type::List(item) | Type::Set(item) => (**item).clone(),
            _ => Type::Any,
        };
        let (key, value) = match receiver {
            Type::Map(key, value) => ((**key).clone(), (**value).clone()),
            _ => (Type::Any, Type::Any),
        };
        let number = Type::unitless();
        let predicate = |item: &Type| {
            Type::Function(FunctionType::new(
                vec![Input::required("item", item.clone())],
                Type::Boolean,
            ))
        };
        let none = |inputs: Vec<Input>, output: Type| FunctionType::new(inputs, output);

        match self {
            M::Sqrt => none(vec![], number),
            M::Abs | M::Round => none(vec![], receiver.clone()),
            M::NumberText => none(vec![], Type::Text),
            M::TextLength => none(vec![], number),
            M::TextHas => none(vec![Input::required("part", Type::Text)], Type::Boolean),
            M::Repeat => none(vec![Input::required("count", number)], Type::Text),
            M::ListLength | M::SetSize | M::MapSize | M::TableSize => none(vec![], number),
            M::First | M::Last => none(vec![], Type::optional(item)),
            M::Get => none(vec![Input::required("index", number)], Type::optional(item)),
            M::Reverse => none(vec![], receiver.clone()),
            M::ListHas | M::SetHas => none(vec![Input::required("item", item)], Type::Boolean),
            M::ListAdd | M::SetAdd | M::SetRemove => {
                none(vec![Input::required("item", item)], receiver.clone())
            }
            M::Translate => FunctionType {
                refine: Some(Refine::ListOfFunctionOutput),
                ..none(
                    vec![Input::required(
                        "translator",
                        Type::Function(FunctionType::new(
                            vec![Input::required("item", item)],
                            Type::Any,
                        )),
                    )],
                    Type::list(Type::Any),
                )
            },
            M::Filter | M::Until => {
                none(vec![Input::required("checker", predicate(&item))], receiver.clone())
            }
            M::All => none(vec![Input::required("checker", predicate(&item))], Type::Boolean),
            M::Find => none(vec![Input::required("checker", predicate(&item))], Type::optional(item)),
            M::Combine => FunctionType {
                refine: Some(Refine::FirstInput),
                ..none(
                    vec![
                        Input::required("initial", Type::Any),
                        Input::required(
                            "combiner",
                            Type::Function(FunctionType::new(
                                vec![
                                    Input::required("combination", Type::Any),
                                    Input::required("item", item),
                                ],
                                Type::Any,
                            )),
                        ),
                    ],
                    Type::Any,
                )
            },
            M::SetList => none(vec![], Type::list(item)),
            M::MapGet => none(vec![Input::required("key", key)], Type::optional(value)),
            M::MapHas => none(vec![Input::required("key", key)], Type::Boolean),
            M::MapSet => none(
                vec![Input::required("key", key), Input::required("value", value)],
                receiver.clone(),
            ),
            M::Keys => none(vec![], Type::list(key)),
            M::Values => none(vec![], Type::list(value)),
        }
    }
}

/// Conversions every program has.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BuiltinConversion {
    NumberToText,
    TextToNumber,
    BooleanToText,
    ListToSet,
    SetToList,
    /// Multiply by this factor to change units.
    Scale(f64),
}

impl BuiltinConversion {
    pub fn find(from: &Type, to: &Type) -> Option<BuiltinConversion> {
        match (from, to) {
            (Type::Number(_), Type::Text) => Some(BuiltinConversion::NumberToText),
            (Type::Text, Type::Number(unit)) if unit.is_unitless() => {
                Some(BuiltinConversion::TextToNumber)
            }
            (Type::Boolean, Type::Text) => Some(BuiltinConversion::BooleanToText),
            (Type::List(_), Type::Set(_)) => Some(BuiltinConversion::ListToSet),
            (Type::Set(_), Type::List(_)) => Some(BuiltinConversion::SetToList),
            (Type::Number(from), Type::Number(to)) => {
                from.conversion_factor(to).map(BuiltinConversion::Scale)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
