pub(crate) mod cmp;
pub(crate) mod hash;
pub(crate) mod numeric;
