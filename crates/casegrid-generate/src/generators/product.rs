/// Odometer over the Cartesian product of per-category value indices.
///
/// The last category varies fastest, so rows come out in standard product
/// order. Yields nothing when there are no categories or any category is
/// empty.
#[derive(Debug, Clone)]
pub struct ProductIndices {
    sizes: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl ProductIndices {
    pub fn new(sizes: Vec<usize>) -> Self {
        let next = if sizes.is_empty() || sizes.contains(&0) {
            None
        } else {
            Some(vec![0; sizes.len()])
        };
        Self { sizes, next }
    }
}

impl Iterator for ProductIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;

        let mut advanced = current.clone();
        for position in (0..advanced.len()).rev() {
            advanced[position] += 1;
            if advanced[position] < self.sizes[position] {
                self.next = Some(advanced);
                break;
            }
            advanced[position] = 0;
        }

        Some(current)
    }
}
