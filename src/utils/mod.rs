//! Small arithmetic and sorted-slice helpers shared across the crate.

/// Computes the binomial coefficient `C(n, k)`.
///
/// Returns `0` when `k > n` and is exact for `n <= 62`. Intermediate
/// products are kept small by dividing as soon as a factor allows it.
pub fn binom(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }

    let k = k.min(n - k);
    let mut n = n;
    let mut res: u64 = 1;

    for j in 1..=k {
        if n % j == 0 {
            res *= n / j;
        } else if res % j == 0 {
            res = res / j * n;
        } else {
            res = res * n / j;
        }
        n -= 1;
    }

    res
}

/// Checks whether the sorted slice `sub` is contained in the sorted slice
/// `sup`, as a single merge pass.
pub fn is_subset<T: Ord>(sub: &[T], sup: &[T]) -> bool {
    iter_set::difference(sub.iter(), sup.iter()).next().is_none()
}
