//! Reference `IdGenerator`. Grounded on the teacher's blanket
//! `Uuid::new_v4()` use at every `Run::new` call site.

use reactor_runner::IdGenerator;

pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_distinct_ids() {
        let gen = UuidIdGenerator;
        let a = gen.generate();
        let b = gen.generate();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
