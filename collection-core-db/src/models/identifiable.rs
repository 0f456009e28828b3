/// Trait for entities addressable by their storage row id.
///
/// The row id is assigned by the store on first insert and is independent of
/// any business-level identifier; a value of 0 marks a not-yet-saved entity.
pub trait Identifiable {
    fn get_id(&self) -> i64;
}
