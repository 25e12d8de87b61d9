use std::any::Any;
use std::marker::PhantomData;

/// Typed handle to a named property column. Obtained from [`PropertySet`]
/// lookups; a handle stays valid until its column is removed or the set is
/// cleared.
#[derive(Debug)]
pub struct PropertyHandle<T> {
    slot: usize,
    _marker: PhantomData<T>,
}

impl<T> PropertyHandle<T> {
    fn new(slot: usize) -> Self {
        return Self {
            slot,
            _marker: PhantomData,
        };
    }
}

impl<T> Clone for PropertyHandle<T> {
    fn clone(&self) -> Self {
        return *self;
    }
}

impl<T> Copy for PropertyHandle<T> {}

trait PropertyStorage: Any {
    fn push_default(&mut self);
    fn resize_default(&mut self, len: usize);
    fn reserve(&mut self, additional: usize);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct PropertyColumn<T> {
    default: T,
    values: Vec<T>,
}

impl<T: Clone + 'static> PropertyStorage for PropertyColumn<T> {
    fn push_default(&mut self) {
        self.values.push(self.default.clone());
    }

    fn resize_default(&mut self, len: usize) {
        self.values.resize(len, self.default.clone());
    }

    fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional);
    }

    fn as_any(&self) -> &dyn Any {
        return self;
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        return self;
    }
}

/// Set of equally-sized named columns, one value per element. Columns are
/// strongly typed; lookups with a wrong type return no handle. Removing a
/// column leaves a vacant slot so other handles stay valid.
#[derive(Default)]
pub struct PropertySet {
    len: usize,
    columns: Vec<Option<(String, Box<dyn PropertyStorage>)>>,
}

impl PropertySet {
    pub fn new() -> Self {
        return Self {
            len: 0,
            columns: Vec::new(),
        };
    }

    /// Number of elements every column holds
    #[inline]
    pub fn len(&self) -> usize {
        return self.len;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Registers a new column. Returns `None` if the name is already taken.
    pub fn add<T: Clone + 'static>(&mut self, name: &str, default: T) -> Option<PropertyHandle<T>> {
        if self.find(name).is_some() {
            return None;
        }

        let mut column = PropertyColumn {
            default,
            values: Vec::new(),
        };
        column.resize_default(self.len);

        let entry = (name.to_string(), Box::new(column) as Box<dyn PropertyStorage>);
        let slot = match self.columns.iter().position(|slot| slot.is_none()) {
            Some(vacant) => {
                self.columns[vacant] = Some(entry);
                vacant
            }
            None => {
                self.columns.push(Some(entry));
                self.columns.len() - 1
            }
        };

        return Some(PropertyHandle::new(slot));
    }

    /// Looks up an existing column. Returns `None` when the name is absent or
    /// the stored type differs.
    pub fn get<T: 'static>(&self, name: &str) -> Option<PropertyHandle<T>> {
        let slot = self.find(name)?;
        let (_, storage) = self.columns[slot].as_ref()?;

        if !storage.as_any().is::<PropertyColumn<T>>() {
            return None;
        }

        return Some(PropertyHandle::new(slot));
    }

    /// Existing column if present, a fresh one otherwise. Returns `None` only
    /// when the name is taken by a column of another type.
    pub fn get_or_add<T: Clone + 'static>(
        &mut self,
        name: &str,
        default: T,
    ) -> Option<PropertyHandle<T>> {
        if self.find(name).is_some() {
            return self.get(name);
        }

        return self.add(name, default);
    }

    pub fn remove<T>(&mut self, handle: PropertyHandle<T>) {
        if handle.slot < self.columns.len() {
            self.columns[handle.slot] = None;
        }
    }

    #[inline]
    pub fn exists(&self, name: &str) -> bool {
        return self.find(name).is_some();
    }

    /// Appends one element to every column, filled with the column default
    pub fn push(&mut self) {
        self.len += 1;
        for column in self.columns.iter_mut().flatten() {
            column.1.push_default();
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        for column in self.columns.iter_mut().flatten() {
            column.1.reserve(additional);
        }
    }

    /// Drops every column and resets the element count
    pub fn clear(&mut self) {
        self.columns.clear();
        self.len = 0;
    }

    /// Column values. Panics if the handle is stale.
    pub fn values<T: 'static>(&self, handle: &PropertyHandle<T>) -> &[T] {
        let (_, storage) = self.columns[handle.slot]
            .as_ref()
            .expect("property was removed");
        let column = storage
            .as_any()
            .downcast_ref::<PropertyColumn<T>>()
            .expect("property type mismatch");

        return &column.values;
    }

    /// Mutable column values. Panics if the handle is stale.
    pub fn values_mut<T: 'static>(&mut self, handle: &PropertyHandle<T>) -> &mut [T] {
        let (_, storage) = self.columns[handle.slot]
            .as_mut()
            .expect("property was removed");
        let column = storage
            .as_any_mut()
            .downcast_mut::<PropertyColumn<T>>()
            .expect("property type mismatch");

        return &mut column.values;
    }

    fn find(&self, name: &str) -> Option<usize> {
        return self
            .columns
            .iter()
            .position(|slot| matches!(slot, Some((slot_name, _)) if slot_name == name));
    }
}
