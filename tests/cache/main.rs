//! Integration tests tying `GraphCaches` and `KeyframeManager` together
//! across a sequence of writes, the way `epochweave_orm` actually drives
//! them.
