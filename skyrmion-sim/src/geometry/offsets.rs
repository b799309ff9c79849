/// Forward bond offsets `(di, dj)` for the 4-neighbor (von Neumann) stencil.
///
/// Returns `[(1,0), (0,1)]`; backward neighbors are the negated offsets,
/// giving coordination number 4.
pub fn von_neumann() -> Vec<(isize, isize)> {
    vec![(1, 0), (0, 1)]
}

/// Forward bond offsets for the 8-neighbor (Moore) stencil.
///
/// Returns `[(1,0), (0,1), (1,1), (1,-1)]`: four forward directions giving
/// coordination number 8.
pub fn moore() -> Vec<(isize, isize)> {
    vec![(1, 0), (0, 1), (1, 1), (1, -1)]
}
