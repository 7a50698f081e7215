pub(crate) mod attribute;
pub(crate) mod color;
pub(crate) mod displace;
pub(crate) mod fur;
pub(crate) mod generators;
pub(crate) mod merge;
pub(crate) mod normal;
pub(crate) mod points;
pub(crate) mod transform;
