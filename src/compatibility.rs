//! Orientation and sex based romantic compatibility.
//!
//! Only romantic matching consults this rule; friendship ignores it.

use crate::person::{Attributes, Orientation};

/// Whether two people can never be romantic partners.
///
/// Symmetric and deterministic.
pub fn incompatible(a: &Attributes, b: &Attributes) -> bool {
    // Orientation codes summing to zero exclude each other outright:
    // straight with gay, and bisexual with bisexual
    if a.orientation.code() + b.orientation.code() == 0 {
        return true;
    }

    rejects(a, b) || rejects(b, a)
}

/// Does `who`'s orientation rule out `other`'s sex
fn rejects(who: &Attributes, other: &Attributes) -> bool {
    let same_sex = who.sex == other.sex;
    match who.orientation {
        Orientation::Straight => same_sex,
        Orientation::Gay => !same_sex,
        Orientation::Bisexual => false,
    }
}

pub fn compatible(a: &Attributes, b: &Attributes) -> bool {
    !incompatible(a, b)
}
