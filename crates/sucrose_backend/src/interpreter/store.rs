use id_collections::id_type;
use std::collections::BTreeMap;
use std::fmt;

use crate::interpreter::Error;
use sucrose_common::data::prim::Const;

#[id_type]
pub struct Addr(pub usize);

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A runtime value. `F` is however the dialect being evaluated represents a function.
#[derive(Clone, Debug)]
pub enum Value<F> {
    Int(i64),
    Bool(bool),
    Unit,
    Pointer(Addr),
    Function(F),
}

impl<F> Value<F> {
    pub fn from_const(val: Const) -> Self {
        match val {
            Const::Int(val) => Value::Int(val),
            Const::Bool(val) => Value::Bool(val),
            Const::Unit => Value::Unit,
        }
    }

    pub fn to_const(&self) -> Option<Const> {
        match self {
            Value::Int(val) => Some(Const::Int(*val)),
            Value::Bool(val) => Some(Const::Bool(*val)),
            Value::Unit => Some(Const::Unit),
            Value::Pointer(_) | Value::Function(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Unit => "unit",
            Value::Pointer(_) => "tuple",
            Value::Function(_) => "function",
        }
    }

    pub fn as_bool(&self) -> Result<bool, Error> {
        match self {
            Value::Bool(val) => Ok(*val),
            other => Err(Error::TypeMismatch {
                expected: "bool",
                found: other.kind(),
            }),
        }
    }

    pub fn as_pointer(&self) -> Result<Addr, Error> {
        match self {
            Value::Pointer(addr) => Ok(*addr),
            other => Err(Error::TypeMismatch {
                expected: "tuple",
                found: other.kind(),
            }),
        }
    }
}

/// Tuple storage shared by every evaluator.
///
/// Blocks are bump-allocated from a monotonically increasing address counter and never freed.
/// Slot `i` of the block at `base` lives at address `base + i`; only block bases are ever handed
/// out as pointers, and every access is checked against the size the block was allocated with.
#[derive(Clone, Debug)]
pub struct Store<F> {
    slots: BTreeMap<Addr, Value<F>>,
    blocks: BTreeMap<Addr, usize>,
    next: usize,
}

impl<F: Clone> Store<F> {
    pub fn new() -> Self {
        Store {
            slots: BTreeMap::new(),
            blocks: BTreeMap::new(),
            next: 0,
        }
    }

    pub fn alloc(&mut self, values: Vec<Value<F>>) -> Addr {
        let base = Addr(self.next);
        // Empty tuples still get an address of their own.
        self.next += values.len().max(1);
        self.blocks.insert(base, values.len());
        for (i, value) in values.into_iter().enumerate() {
            self.slots.insert(Addr(base.0 + i), value);
        }
        base
    }

    fn slot(&self, base: Addr, index: usize) -> Result<Addr, Error> {
        let size = *self.blocks.get(&base).ok_or(Error::InvalidAddress(base))?;
        if index >= size {
            return Err(Error::OutOfBounds { index, size });
        }
        Ok(Addr(base.0 + index))
    }

    pub fn load(&self, base: Addr, index: usize) -> Result<Value<F>, Error> {
        let addr = self.slot(base, index)?;
        self.slots
            .get(&addr)
            .cloned()
            .ok_or(Error::InvalidAddress(addr))
    }

    pub fn store(&mut self, base: Addr, index: usize, value: Value<F>) -> Result<(), Error> {
        let addr = self.slot(base, index)?;
        self.slots.insert(addr, value);
        Ok(())
    }

    /// The current contents of the block at `base`.
    pub fn block(&self, base: Addr) -> Result<Vec<Value<F>>, Error> {
        let size = *self.blocks.get(&base).ok_or(Error::InvalidAddress(base))?;
        (0..size).map(|index| self.load(base, index)).collect()
    }

    /// Every allocated block, as `(base, size)`, in allocation order.
    pub fn blocks(&self) -> impl Iterator<Item = (Addr, usize)> + '_ {
        self.blocks.iter().map(|(base, size)| (*base, *size))
    }
}

impl<F: Clone> Default for Store<F> {
    fn default() -> Self {
        Self::new()
    }
}
