//! Ranking functions that turn piece arrangements into dense coordinates.

pub const BINOMIAL: [[u32; 25]; 25] = {
    let mut arr = [[0; 25]; 25];
    let mut n = 0;
    while n < arr.len() {
        arr[n][0] = 1;
        let mut k = 1;
        while k <= n {
            arr[n][k] = arr[n - 1][k - 1] + arr[n - 1][k];
            k += 1;
        }
        n += 1;
    }
    arr
};

const FACT_UNTIL_12: [u32; 13] = {
    let mut arr = [0; 13];
    arr[0] = 1;
    let mut i = 1;
    while i < arr.len() {
        arr[i] = arr[i - 1] * i as u32;
        i += 1;
    }
    arr
};

/// Colexicographic rank of the set bits of `mask` among all sets of the same
/// size. Sets of `k` elements drawn from `n` rank densely into
/// `0..BINOMIAL[n][k]`, with the lowest `k` bits ranking zero.
#[must_use]
pub fn rank_combination(mut mask: u32) -> u32 {
    let mut rank = 0;
    let mut k = 1;
    while mask != 0 {
        let pos = mask.trailing_zeros() as usize;
        rank += BINOMIAL[pos][k];
        k += 1;
        mask &= mask - 1;
    }
    rank
}

/// Gather the bits of `mask` at `slots` into the low bits of the result.
#[must_use]
pub fn compress(mask: u32, slots: &[u8]) -> u32 {
    slots
        .iter()
        .enumerate()
        .fold(0, |out, (i, &slot)| out | ((mask >> slot) & 1) << i)
}

/// Lehmer rank of the relative order of `perm`. The sorted sequence ranks
/// zero.
#[must_use]
pub fn rank_permutation(perm: &[u8]) -> u32 {
    let n = perm.len();
    (0..n)
        .map(|i| {
            let smaller_after = perm[i + 1..].iter().filter(|&&p| p < perm[i]).count();
            smaller_after as u32 * FACT_UNTIL_12[n - 1 - i]
        })
        .sum()
}

/// Whether `perm` is an odd permutation.
#[must_use]
pub fn is_odd(perm: &[u8]) -> bool {
    let mut inversions = 0;
    for i in 0..perm.len() {
        for j in i + 1..perm.len() {
            if perm[i] > perm[j] {
                inversions += 1;
            }
        }
    }
    inversions % 2 == 1
}

/// Orientations of all but the last piece read as a base `base` number. The
/// last orientation is implied by the others.
#[must_use]
pub fn rank_orientation(orientation: &[u8], base: u16) -> u16 {
    orientation[..orientation.len() - 1]
        .iter()
        .fold(0, |rank, &o| rank * base + u16::from(o))
}
