use crate::DeclId;
use std::rc::Rc;

/// The fixed builtin-type table spec §4.B maps to Target primitives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CBuiltin {
    Void,
    Bool,
    Char,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Int128,
    UInt128,
    Float,
    Double,
    LongDouble,
    Float128,
    Float16,
}

impl CBuiltin {
    /// Width ordering used by the integer-to-integer cast ladder in
    /// spec §4.E, rule 2. Floats and void have no place on the ladder.
    pub fn integer_rank(self) -> Option<u8> {
        use CBuiltin::*;
        Some(match self {
            Bool => 0,
            Char | SChar | UChar => 1,
            Short | UShort => 2,
            Int | UInt => 3,
            Long | ULong => 4,
            LongLong | ULongLong => 5,
            Int128 | UInt128 => 6,
            _ => return None,
        })
    }

    pub fn is_signed(self) -> bool {
        use CBuiltin::*;
        matches!(self, Char | SChar | Short | Int | Long | LongLong | Int128)
    }

    pub fn is_integer(self) -> bool {
        self.integer_rank().is_some()
    }

    pub fn is_float(self) -> bool {
        use CBuiltin::*;
        matches!(self, Float | Double | LongDouble | Float128 | Float16)
    }
}

/// A C type, before qualifiers are applied. Mirrors the type-class
/// dispatch table in spec §4.B.
#[derive(Clone, Debug, PartialEq)]
pub enum CType {
    Builtin(CBuiltin),
    Pointer(Box<CQualType>),
    ConstantArray { elem: Box<CQualType>, size: u64 },
    IncompleteArray { elem: Box<CQualType> },
    Typedef { name: String, target: Box<CQualType>, canonical: DeclId },
    Record(DeclId),
    Enum(DeclId),
    FunctionProto { ret: Box<CQualType>, params: Vec<CQualType>, variadic: bool },
    /// `RT(*)(...)`-shaped sugar the front-end leaves around; all four
    /// unwrap transparently per spec §4.B.
    Elaborated(Box<CQualType>),
    Paren(Box<CQualType>),
    Decayed(Box<CQualType>),
    Attributed(Box<CQualType>),
    MacroQualified(Box<CQualType>),
}

/// A C type with its `const`/`volatile` qualifiers. `Rc` because the same
/// underlying type (e.g. a record) is referenced from many sites.
#[derive(Clone, Debug, PartialEq)]
pub struct CQualType {
    pub ty: Rc<CType>,
    pub is_const: bool,
    pub is_volatile: bool,
}

impl CQualType {
    pub fn new(ty: CType) -> Self {
        CQualType { ty: Rc::new(ty), is_const: false, is_volatile: false }
    }

    pub fn unqualified(ty: Rc<CType>) -> Self {
        CQualType { ty, is_const: false, is_volatile: false }
    }

    pub fn with_const(mut self, is_const: bool) -> Self {
        self.is_const = is_const;
        self
    }

    pub fn with_volatile(mut self, is_volatile: bool) -> Self {
        self.is_volatile = is_volatile;
        self
    }

    pub fn builtin(b: CBuiltin) -> Self {
        CQualType::new(CType::Builtin(b))
    }

    /// Strips the transparent sugar nodes spec §4.B says to unwrap before
    /// inspecting a type's "real" class.
    pub fn desugar(&self) -> &CQualType {
        match &*self.ty {
            CType::Elaborated(inner)
            | CType::Paren(inner)
            | CType::Decayed(inner)
            | CType::Attributed(inner)
            | CType::MacroQualified(inner) => inner.desugar(),
            _ => self,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(&*self.desugar().ty, CType::Builtin(CBuiltin::Void))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CField {
    pub name: Option<String>,
    pub ty: CQualType,
    pub bit_width: Option<u32>,
    pub is_flexible_array: bool,
    pub align: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CRecordDef {
    pub id: DeclId,
    pub name: Option<String>,
    pub is_union: bool,
    /// `None` for a forward declaration with no body.
    pub fields: Option<Vec<CField>>,
    /// An explicit `_Alignas`/`__attribute__((aligned(N)))` on the record
    /// type itself, as opposed to on one of its members.
    pub align: Option<u32>,
    pub loc: crate::SourceLoc,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CEnumerator {
    pub name: String,
    pub value: i128,
    /// False when the value was the compiler-assigned successor of the
    /// previous enumerator (spec §4.C: "every enumerator has an implicit
    /// value").
    pub is_explicit: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CEnumDef {
    pub id: DeclId,
    pub name: Option<String>,
    pub underlying: CQualType,
    pub enumerators: Vec<CEnumerator>,
    pub loc: crate::SourceLoc,
}

impl CEnumDef {
    pub fn all_implicit(&self) -> bool {
        self.enumerators.iter().all(|e| !e.is_explicit)
    }
}
