//! Shapes and shape factories.
//!
//! A shape is the target type a plain mapping is turned into. It carries an
//! open field bag that receives the copied data, plus whatever behavior the
//! implementing type defines. Callers get their concrete type back through
//! [`Node::downcast_ref`](crate::domain::Node::downcast_ref).

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::domain::node::{Fields, Node};

/// A type plain data can be mixed into.
///
/// Implement it by hand, or with [`impl_shape!`](crate::impl_shape) for a
/// struct that keeps its data in a `fields: Fields` member.
pub trait Shape: Any + fmt::Debug {
    /// Name shown in rendered output and diagnostics.
    fn shape_name(&self) -> &str;

    fn fields(&self) -> &Fields;

    fn fields_mut(&mut self) -> &mut Fields;

    /// Give up the field bag, e.g. when the node is mixed into another shape.
    fn into_fields(self: Box<Self>) -> Fields;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Permissive field assignment: no declared-field validation, last write wins.
    fn assign(&mut self, key: String, value: Node) {
        self.fields_mut().insert(key, value);
    }

    fn get(&self, key: &str) -> Option<&Node> {
        self.fields().get(key)
    }
}

/// Zero-argument constructor producing fresh, empty shape instances.
pub trait ShapeFactory {
    fn create(&self) -> Box<dyn Shape>;
}

impl<F> ShapeFactory for F
where
    F: Fn() -> Box<dyn Shape>,
{
    fn create(&self) -> Box<dyn Shape> {
        self()
    }
}

/// Factory for any `Shape + Default` type, see [`factory`].
pub struct Construct<T>(PhantomData<fn() -> T>);

impl<T> fmt::Debug for Construct<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Construct<{}>", std::any::type_name::<T>())
    }
}

impl<T: Shape + Default> ShapeFactory for Construct<T> {
    fn create(&self) -> Box<dyn Shape> {
        Box::new(T::default())
    }
}

/// Factory constructing `T::default()`.
///
/// ```
/// use jsonmix::domain::{factory, Record, ShapeFactory};
///
/// let shape = factory::<Record>().create();
/// assert!(shape.fields().is_empty());
/// ```
pub fn factory<T: Shape + Default>() -> Construct<T> {
    Construct(PhantomData)
}

/// Dynamic shape: a name plus an open field bag.
#[derive(Debug, Default)]
pub struct Record {
    name: String,
    fields: Fields,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Fields::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Node>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Shape for Record {
    fn shape_name(&self) -> &str {
        if self.name.is_empty() {
            "Record"
        } else {
            &self.name
        }
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    fn into_fields(self: Box<Self>) -> Fields {
        self.fields
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Factory for named [`Record`]s with predefined default fields.
///
/// Defaults are kept as plain JSON so each created instance gets its own copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFactory {
    name: String,
    defaults: Map<String, Value>,
}

impl RecordFactory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: Map::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }
}

impl ShapeFactory for RecordFactory {
    fn create(&self) -> Box<dyn Shape> {
        let mut record = Record::new(self.name.clone());
        for (k, v) in &self.defaults {
            record.fields.insert(k.clone(), Node::from(v.clone()));
        }
        Box::new(record)
    }
}

/// Implement [`Shape`] for a struct with a `fields: Fields` member.
///
/// ```
/// use jsonmix::domain::{Fields, Node, Shape};
///
/// #[derive(Debug, Default)]
/// struct Employee {
///     fields: Fields,
/// }
/// jsonmix::impl_shape!(Employee);
///
/// impl Employee {
///     fn greeting(&self) -> String {
///         let name = self.get("name").and_then(Node::as_str).unwrap_or("stranger");
///         format!("Hello, {}", name)
///     }
/// }
///
/// let mut e = Employee::default();
/// e.assign("name".into(), Node::from("Sam"));
/// assert_eq!(e.greeting(), "Hello, Sam");
/// assert_eq!(e.shape_name(), "Employee");
/// ```
#[macro_export]
macro_rules! impl_shape {
    ($ty:ty) => {
        $crate::impl_shape!($ty, stringify!($ty));
    };
    ($ty:ty, $name:expr) => {
        impl $crate::domain::Shape for $ty {
            fn shape_name(&self) -> &str {
                $name
            }

            fn fields(&self) -> &$crate::domain::Fields {
                &self.fields
            }

            fn fields_mut(&mut self) -> &mut $crate::domain::Fields {
                &mut self.fields
            }

            fn into_fields(self: Box<Self>) -> $crate::domain::Fields {
                self.fields
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }
    };
}
