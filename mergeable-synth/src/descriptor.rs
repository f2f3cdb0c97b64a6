use serde::{Deserialize, Serialize};

/// Semantic type of an entity field as reported by host introspection.
///
/// The synthesis engine never inspects the inner type of a collection or
/// array; it only needs enough shape to apply the eligibility rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemanticType {
    /// Primitive or scalar value type (e.g. `"String"`, `"i64"`).
    Scalar(String),
    /// Reference to another (or the same) entity type.
    EntityRef(String),
    /// Collection of the inner type.
    Collection(Box<SemanticType>),
    /// Array of the inner type.
    Array(Box<SemanticType>),
}

impl SemanticType {
    /// Returns `true` for collection-typed fields.
    pub fn is_collection(&self) -> bool {
        matches!(self, SemanticType::Collection(_))
    }

    /// Returns `true` for array-typed fields.
    pub fn is_array(&self) -> bool {
        matches!(self, SemanticType::Array(_))
    }
}

/// One field of an entity type: name, semantic type, modifier flags and
/// role tags. Supplied by the host's type introspection and treated as
/// immutable input by the filter and the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: SemanticType,
    pub is_static: bool,
    pub is_transient: bool,
    pub is_identity: bool,
    pub is_version: bool,
}

impl FieldDescriptor {
    /// Create a plain instance field with no modifiers and no role.
    pub fn new(name: impl Into<String>, ty: SemanticType) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            is_transient: false,
            is_identity: false,
            is_version: false,
        }
    }

    /// Mark the field as static.
    pub fn statically_declared(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark the field as transient.
    pub fn transient(mut self) -> Self {
        self.is_transient = true;
        self
    }

    /// Tag the field as (part of) the entity identity.
    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    /// Tag the field as the optimistic-locking version field.
    pub fn version(mut self) -> Self {
        self.is_version = true;
        self
    }
}

/// Signature of a member already declared on the target type: method name
/// plus parameter arity. The synthesizer uses these to avoid re-declaring
/// user-written members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSignature {
    pub name: String,
    pub arity: usize,
}

impl MemberSignature {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

/// Structural description of one entity type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Entity type name.
    pub entity: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Members the target type already declares by hand.
    pub declared_members: Vec<MemberSignature>,
}

impl TypeDescriptor {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            fields: Vec::new(),
            declared_members: Vec::new(),
        }
    }

    /// Append a field, preserving declaration order.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Record a hand-written member on the target type.
    pub fn declared_member(mut self, name: impl Into<String>, arity: usize) -> Self {
        self.declared_members.push(MemberSignature::new(name, arity));
        self
    }

    /// Names of the fields tagged as identity, in declaration order.
    pub fn identity_field_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| field.is_identity)
            .map(|field| field.name.clone())
            .collect()
    }

    /// Name of the version field, if the type declares one.
    pub fn version_field_name(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.is_version)
            .map(|field| field.name.as_str())
    }

    /// Whether the target type already declares a member with this
    /// name and arity.
    pub fn declares(&self, name: &str, arity: usize) -> bool {
        self.declared_members
            .iter()
            .any(|member| member.name == name && member.arity == arity)
    }
}

/// Output of the eligibility filter: the ordered subsequence of a type's
/// fields that participate in value copying during merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeableFieldSet {
    fields: Vec<FieldDescriptor>,
}

impl MergeableFieldSet {
    pub(crate) fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    /// The eligible fields, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field names, in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// An empty set is valid: merge then only creates and links records
    /// without copying data.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a MergeableFieldSet {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
