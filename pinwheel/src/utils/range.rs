/// An inclusive `[start, end]` range (of degrees, microseconds, etc.).
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Range<T> {
    pub start: T,
    pub end: T,
}

impl<T: Copy + PartialOrd> Range<T> {
    /// Returns a copy of the range ordered so that `start <= end`.
    pub fn ordered(self) -> Self {
        match self.start <= self.end {
            true => self,
            false => Self {
                start: self.end,
                end: self.start,
            },
        }
    }

    /// Checks if `value` lies within the range (bounds included).
    pub fn contains(&self, value: T) -> bool {
        self.start <= value && value <= self.end
    }
}

impl Range<u16> {
    /// Returns the distance between both bounds.
    pub fn span(&self) -> u16 {
        self.end.abs_diff(self.start)
    }
}

impl<T: Copy> From<[T; 2]> for Range<T> {
    fn from(value: [T; 2]) -> Self {
        Self {
            start: value[0],
            end: value[1],
        }
    }
}

#[cfg(feature = "serde")]
impl<T> serde::Serialize for Range<T>
where
    T: serde::Serialize + Copy,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize the Range as an array [start, end]
        [self.start, self.end].serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for Range<T>
where
    T: serde::Deserialize<'de> + Copy,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Deserialize from an array [start, end]
        let array: [T; 2] = serde::Deserialize::deserialize(deserializer)?;
        Ok(Self::from(array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_from_array() {
        let range: Range<u16> = [5, 15].into();
        assert_eq!(range.start, 5);
        assert_eq!(range.end, 15);
    }

    #[test]
    fn test_range_ordered() {
        assert_eq!(Range::from([180, 0]).ordered(), Range::from([0, 180]));
        assert_eq!(Range::from([10, 20]).ordered(), Range::from([10, 20]));
    }

    #[test]
    fn test_range_contains() {
        let range = Range::from([0u16, 180]);
        assert!(range.contains(0));
        assert!(range.contains(90));
        assert!(range.contains(180));
        assert!(!range.contains(181));
    }

    #[test]
    fn test_range_span() {
        assert_eq!(Range::from([0u16, 180]).span(), 180);
        assert_eq!(Range::from([40u16, 30]).span(), 10);
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[derive(serde::Deserialize, serde::Serialize)]
        struct Wrapper {
            range: Range<u16>,
        }

        #[test]
        fn test_range_toml() {
            let wrapper: Wrapper = toml::from_str("range = [7, 14]").unwrap();
            assert_eq!(wrapper.range, Range::from([7, 14]));
            let text = toml::to_string(&wrapper).unwrap();
            assert_eq!(text.trim(), "range = [7, 14]");
        }
    }
}
