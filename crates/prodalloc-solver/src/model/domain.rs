//! Integer variable domains.

/// Admissible values of an integer variable.
///
/// # Examples
///
/// ```
/// use prodalloc_solver::model::Domain;
///
/// let d = Domain::stepped(0, 25, 10);
/// assert_eq!(d.max(), Some(20));
/// assert_eq!(d.ceil_value(11), Some(20));
/// assert_eq!(d.floor_value(19), Some(10));
/// assert!(!d.contains(15));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    /// Every integer in `[lo, hi]`.
    Interval { lo: i64, hi: i64 },

    /// `lo, lo + step, ...` up to and including `hi`; `hi` is always on the grid.
    Stepped { lo: i64, hi: i64, step: i64 },

    /// An explicit sorted set of values.
    Values(Vec<i64>),
}

impl Domain {
    pub fn interval(lo: i64, hi: i64) -> Self {
        Domain::Interval { lo, hi }
    }

    pub fn singleton(value: i64) -> Self {
        Domain::Interval {
            lo: value,
            hi: value,
        }
    }

    /// Arithmetic progression from `lo`; a step of 1 (or less) is an interval.
    pub fn stepped(lo: i64, hi: i64, step: i64) -> Self {
        if step <= 1 {
            return Domain::Interval { lo, hi };
        }
        if hi < lo {
            return Domain::Values(Vec::new());
        }
        let span = hi as i128 - lo as i128;
        let last = lo as i128 + span / step as i128 * step as i128;
        Domain::Stepped {
            lo,
            hi: last as i64,
            step,
        }
    }

    /// Explicit values; duplicates are removed.
    pub fn values(values: impl IntoIterator<Item = i64>) -> Self {
        let mut values: Vec<i64> = values.into_iter().collect();
        values.sort_unstable();
        values.dedup();
        Domain::Values(values)
    }

    /// Restricts the domain to `[lo, hi]`.
    pub fn clamp(&self, lo: i64, hi: i64) -> Self {
        match self {
            Domain::Interval { lo: a, hi: b } => Domain::Interval {
                lo: lo.max(*a),
                hi: hi.min(*b),
            },
            Domain::Stepped { step, .. } => match (self.ceil_value(lo), self.floor_value(hi)) {
                (Some(first), Some(last)) if first <= last => Domain::Stepped {
                    lo: first,
                    hi: last,
                    step: *step,
                },
                _ => Domain::Values(Vec::new()),
            },
            Domain::Values(values) => Domain::Values(
                values
                    .iter()
                    .copied()
                    .filter(|v| (lo..=hi).contains(v))
                    .collect(),
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Domain::Interval { lo, hi } | Domain::Stepped { lo, hi, .. } => lo > hi,
            Domain::Values(values) => values.is_empty(),
        }
    }

    pub fn min(&self) -> Option<i64> {
        if self.is_empty() {
            return None;
        }
        match self {
            Domain::Interval { lo, .. } | Domain::Stepped { lo, .. } => Some(*lo),
            Domain::Values(values) => values.first().copied(),
        }
    }

    pub fn max(&self) -> Option<i64> {
        if self.is_empty() {
            return None;
        }
        match self {
            Domain::Interval { hi, .. } | Domain::Stepped { hi, .. } => Some(*hi),
            Domain::Values(values) => values.last().copied(),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        match self {
            Domain::Interval { lo, hi } => (*lo..=*hi).contains(&value),
            Domain::Stepped { lo, hi, step } => {
                (*lo..=*hi).contains(&value) && (value as i128 - *lo as i128) % *step as i128 == 0
            }
            Domain::Values(values) => values.binary_search(&value).is_ok(),
        }
    }

    /// Number of admissible values.
    pub fn size(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        match self {
            Domain::Interval { lo, hi } => (*hi as i128 - *lo as i128 + 1) as u64,
            Domain::Stepped { lo, hi, step } => {
                ((*hi as i128 - *lo as i128) / *step as i128 + 1) as u64
            }
            Domain::Values(values) => values.len() as u64,
        }
    }

    /// Smallest admissible value `>= value`.
    pub fn ceil_value(&self, value: i64) -> Option<i64> {
        if self.is_empty() {
            return None;
        }
        match self {
            Domain::Interval { lo, hi } => (value <= *hi).then(|| value.max(*lo)),
            Domain::Stepped { lo, hi, step } => {
                if value <= *lo {
                    return Some(*lo);
                }
                if value > *hi {
                    return None;
                }
                let offset = value as i128 - *lo as i128;
                let step = *step as i128;
                let k = (offset + step - 1) / step;
                Some((*lo as i128 + k * step) as i64)
            }
            Domain::Values(values) => {
                let idx = values.partition_point(|v| *v < value);
                values.get(idx).copied()
            }
        }
    }

    /// Largest admissible value `<= value`.
    pub fn floor_value(&self, value: i64) -> Option<i64> {
        if self.is_empty() {
            return None;
        }
        match self {
            Domain::Interval { lo, hi } => (value >= *lo).then(|| value.min(*hi)),
            Domain::Stepped { lo, hi, step } => {
                if value >= *hi {
                    return Some(*hi);
                }
                if value < *lo {
                    return None;
                }
                let offset = value as i128 - *lo as i128;
                let step = *step as i128;
                Some((*lo as i128 + offset / step * step) as i64)
            }
            Domain::Values(values) => {
                let idx = values.partition_point(|v| *v <= value);
                idx.checked_sub(1).map(|i| values[i])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval() {
        let d = Domain::interval(2, 5);
        assert_eq!(d.size(), 4);
        assert_eq!(d.ceil_value(0), Some(2));
        assert_eq!(d.ceil_value(6), None);
        assert_eq!(d.floor_value(9), Some(5));
        assert_eq!(d.floor_value(1), None);
        assert!(Domain::interval(3, 2).is_empty());
    }

    #[test]
    fn test_stepped_normalizes_upper_bound() {
        let d = Domain::stepped(5, 27, 10);
        assert_eq!(d, Domain::Stepped { lo: 5, hi: 25, step: 10 });
        assert_eq!(d.size(), 3);
        assert_eq!(d.ceil_value(6), Some(15));
        assert_eq!(d.ceil_value(26), None);
        assert_eq!(d.floor_value(24), Some(15));
        assert_eq!(d.floor_value(4), None);
        assert_eq!(Domain::stepped(0, 9, 1), Domain::interval(0, 9));
    }

    #[test]
    fn test_values() {
        let d = Domain::values([30, 10, 20, 10]);
        assert_eq!(d, Domain::Values(vec![10, 20, 30]));
        assert_eq!(d.ceil_value(11), Some(20));
        assert_eq!(d.floor_value(29), Some(20));
        assert_eq!(d.floor_value(9), None);
        assert!(d.contains(30));
        assert!(!d.contains(25));
    }

    #[test]
    fn test_clamp() {
        assert_eq!(Domain::interval(0, 100).clamp(10, 20), Domain::interval(10, 20));
        assert_eq!(
            Domain::stepped(0, 100, 10).clamp(11, 45),
            Domain::Stepped { lo: 20, hi: 40, step: 10 }
        );
        assert!(Domain::stepped(0, 100, 10).clamp(11, 19).is_empty());
        assert_eq!(
            Domain::values([1, 5, 9]).clamp(2, 9),
            Domain::Values(vec![5, 9])
        );
    }
}
