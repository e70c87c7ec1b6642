pub(crate) mod relationships;
