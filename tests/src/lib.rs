//! Cross-crate tests exercising the compiler and runtime together.

#[cfg(test)]
mod matching;
#[cfg(test)]
mod properties;
#[cfg(test)]
mod serialization_deserialization;
