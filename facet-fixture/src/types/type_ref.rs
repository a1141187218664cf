use core::fmt;
use core::str::FromStr;

/// A use-site reference to a type: a name plus the generic arguments bound
/// at that site, or an array of some element type.
///
/// The textual form mirrors Rust type syntax: `HashMap<String, Vec<i32>>`,
/// `[Person]` (sized by configuration), `[u8; 16]` (fixed length).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeRef {
    /// A named type, possibly generic
    Named {
        /// Type identifier, as registered in the [`crate::ShapeRegistry`]
        name: String,
        /// Generic arguments bound at this site (empty for raw/legacy use)
        args: Vec<TypeRef>,
    },
    /// An array of `elem`
    Array {
        /// Element type
        elem: Box<TypeRef>,
        /// Fixed length, if the array type carries one
        len: Option<usize>,
    },
}

impl TypeRef {
    /// A non-generic named type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A generic named type with its arguments.
    pub fn generic(name: impl Into<String>, args: impl IntoIterator<Item = TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// An array sized by configuration (or by a size attribute).
    pub fn array(elem: TypeRef) -> Self {
        TypeRef::Array {
            elem: Box::new(elem),
            len: None,
        }
    }

    /// An array with a fixed length.
    pub fn fixed_array(elem: TypeRef, len: usize) -> Self {
        TypeRef::Array {
            elem: Box::new(elem),
            len: Some(len),
        }
    }

    /// Parses the textual form, see [`TypeRef`].
    pub fn parse(input: &str) -> Result<Self, TypeRefError> {
        let mut parser = Parser { input, pos: 0 };
        let ty = parser.ty()?;
        parser.skip_ws();
        if parser.pos != input.len() {
            return Err(parser.err("trailing input after type"));
        }
        Ok(ty)
    }

    /// The type identifier, or `None` for arrays.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            TypeRef::Array { .. } => None,
        }
    }

    /// Generic arguments (empty for arrays).
    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named { args, .. } => args,
            TypeRef::Array { .. } => &[],
        }
    }

    /// Replaces every named reference that matches a binding with the bound
    /// type, recursively.
    pub fn substitute(&self, bindings: &GenericBindings) -> TypeRef {
        match self {
            TypeRef::Named { name, args } => {
                if args.is_empty() {
                    if let Some(bound) = bindings.get(name) {
                        return bound.clone();
                    }
                }
                TypeRef::Named {
                    name: name.clone(),
                    args: args.iter().map(|arg| arg.substitute(bindings)).collect(),
                }
            }
            TypeRef::Array { elem, len } => TypeRef::Array {
                elem: Box::new(elem.substitute(bindings)),
                len: *len,
            },
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, args } => {
                write!(f, "{name}")?;
                if let Some((first, rest)) = args.split_first() {
                    write!(f, "<{first}")?;
                    for arg in rest {
                        write!(f, ", {arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Array { elem, len: None } => write!(f, "[{elem}]"),
            TypeRef::Array {
                elem,
                len: Some(len),
            } => write!(f, "[{elem}; {len}]"),
        }
    }
}

impl FromStr for TypeRef {
    type Err = TypeRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeRef::parse(s)
    }
}

/// A type reference string that does not parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRefError {
    /// The full input
    pub input: String,
    /// Byte offset where parsing stopped
    pub position: usize,
    /// What was expected
    pub message: &'static str,
}

impl fmt::Display for TypeRefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at offset {} in `{}`",
            self.message, self.position, self.input
        )
    }
}

impl core::error::Error for TypeRefError {}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn err(&self, message: &'static str) -> TypeRefError {
        TypeRefError {
            input: self.input.to_string(),
            position: self.pos,
            message,
        }
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn ty(&mut self) -> Result<TypeRef, TypeRefError> {
        if self.eat('[') {
            let elem = self.ty()?;
            let len = if self.eat(';') {
                Some(self.number()?)
            } else {
                None
            };
            if !self.eat(']') {
                return Err(self.err("expected `]`"));
            }
            return Ok(TypeRef::Array {
                elem: Box::new(elem),
                len,
            });
        }

        let name = self.ident()?;
        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.ty()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.err("expected `,` or `>`"));
            }
        }
        Ok(TypeRef::Named { name, args })
    }

    fn ident(&mut self) -> Result<String, TypeRefError> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(i, c)| {
                !(c == '_' || c.is_ascii_alphabetic() || (i > 0 && (c.is_ascii_digit() || c == ':')))
            })
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.err("expected a type name"));
        }
        let ident = rest[..len].to_string();
        self.pos += len;
        Ok(ident)
    }

    fn number(&mut self) -> Result<usize, TypeRefError> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let value = rest[..len]
            .parse()
            .map_err(|_| self.err("expected an array length"))?;
        self.pos += len;
        Ok(value)
    }
}

/// Generic parameter bindings in effect at a use-site: declared parameter
/// name to bound type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenericBindings {
    entries: Vec<(String, TypeRef)>,
}

impl GenericBindings {
    /// No bindings.
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Binds `name` to `ty`, replacing an earlier binding of the same name.
    pub fn bind(&mut self, name: impl Into<String>, ty: TypeRef) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = ty,
            None => self.entries.push((name, ty)),
        }
    }

    /// Looks up the type bound to `name`.
    pub fn get(&self, name: &str) -> Option<&TypeRef> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| ty)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bindings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeRef)> {
        self.entries.iter().map(|(n, ty)| (n.as_str(), ty))
    }
}

impl<N: Into<String>> FromIterator<(N, TypeRef)> for GenericBindings {
    fn from_iter<I: IntoIterator<Item = (N, TypeRef)>>(iter: I) -> Self {
        let mut bindings = GenericBindings::empty();
        for (name, ty) in iter {
            bindings.bind(name, ty);
        }
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_generics() {
        let ty = TypeRef::parse("HashMap<String, Vec<Option<i32>>>").unwrap();
        assert_eq!(
            ty,
            TypeRef::generic(
                "HashMap",
                [
                    TypeRef::named("String"),
                    TypeRef::generic(
                        "Vec",
                        [TypeRef::generic("Option", [TypeRef::named("i32")])]
                    ),
                ]
            )
        );
        insta::assert_snapshot!(ty, @"HashMap<String, Vec<Option<i32>>>");
    }

    #[test]
    fn parses_arrays() {
        assert_eq!(
            TypeRef::parse("[ u8 ; 16 ]").unwrap(),
            TypeRef::fixed_array(TypeRef::named("u8"), 16)
        );
        let ty = TypeRef::parse("[Vec<String>]").unwrap();
        insta::assert_snapshot!(ty, @"[Vec<String>]");
    }

    #[test]
    fn parses_paths() {
        let ty = TypeRef::parse("chrono::NaiveDate").unwrap();
        assert_eq!(ty.name(), Some("chrono::NaiveDate"));
    }

    #[test]
    fn rejects_garbage() {
        let err = TypeRef::parse("Vec<String").unwrap_err();
        insta::assert_snapshot!(err, @"expected `,` or `>` at offset 10 in `Vec<String`");
        assert!(TypeRef::parse("").is_err());
        assert!(TypeRef::parse("Vec<String>>").is_err());
        assert!(TypeRef::parse("[u8; x]").is_err());
    }

    #[test]
    fn substitutes_bound_parameters() {
        let bindings: GenericBindings = [
            ("K", TypeRef::named("String")),
            ("V", TypeRef::named("i32")),
        ]
        .into_iter()
        .collect();
        let declared = TypeRef::parse("HashMap<K, [V; 2]>").unwrap();
        assert_eq!(
            declared.substitute(&bindings).to_string(),
            "HashMap<String, [i32; 2]>"
        );
    }
}
