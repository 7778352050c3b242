/// Index of the first largest value. Incomparable values (NaN) are skipped.
pub fn argmax<T: PartialOrd>(iter: impl Iterator<Item = T>) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for (i, v) in iter.enumerate() {
        if v.partial_cmp(&v).is_none() {
            continue;
        }
        if best.as_ref().map_or(true, |(_, b)| v > *b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod test {
    use super::argmax;

    #[test]
    fn argmax_first() {
        assert_eq!(argmax([1.0, 3.0, 3.0, 2.0].iter()), Some(1));
        assert_eq!(argmax(std::iter::empty::<f64>()), None);
        assert_eq!(argmax([f64::NAN, 1.0].iter()), Some(1));
    }
}
