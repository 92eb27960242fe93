use super::anchor::{ReadAnchor, Strand};

///
/// All read anchors of one chromosome, split by strand.
///
#[derive(PartialEq, Debug, Clone)]
pub struct ChromosomeReads {
    pub name: String,
    pub length: u64,
    /// Number of mappable base pairs; equals `length` unless a mappability
    /// table says otherwise.
    pub mappable_length: u64,
    pub forward: Vec<ReadAnchor>,
    pub reverse: Vec<ReadAnchor>,
}

impl ChromosomeReads {
    pub fn new<S: Into<String>>(name: S, length: u64) -> Self {
        ChromosomeReads {
            name: name.into(),
            length,
            mappable_length: length,
            forward: Vec::new(),
            reverse: Vec::new(),
        }
    }

    pub fn with_mappable_length(mut self, mappable_length: u64) -> Self {
        self.mappable_length = mappable_length;
        self
    }

    ///
    /// Build a chromosome from plain, non-duplicate anchor positions.
    ///
    pub fn from_positions<S: Into<String>>(
        name: S,
        length: u64,
        forward: &[i64],
        reverse: &[i64],
    ) -> Self {
        let mut chrom = ChromosomeReads::new(name, length);
        chrom.forward = forward.iter().map(|&p| ReadAnchor::new(p)).collect();
        chrom.reverse = reverse.iter().map(|&p| ReadAnchor::new(p)).collect();
        chrom
    }

    pub fn push(&mut self, strand: Strand, anchor: ReadAnchor) {
        match strand {
            Strand::Forward => self.forward.push(anchor),
            Strand::Reverse => self.reverse.push(anchor),
        }
    }

    pub fn anchors(&self, strand: Strand) -> &[ReadAnchor] {
        match strand {
            Strand::Forward => &self.forward,
            Strand::Reverse => &self.reverse,
        }
    }

    /// True when `position` lies in `[0, length)`.
    #[inline]
    pub fn contains(&self, position: i64) -> bool {
        position >= 0 && (position as u64) < self.length
    }

    ///
    /// Non-duplicate reads on one strand whose anchor lies on the chromosome.
    /// Anchors past either end never reach a density and are not counted.
    ///
    pub fn nonredundant_reads_on(&self, strand: Strand) -> u64 {
        self.anchors(strand)
            .iter()
            .filter(|a| a.is_counted() && self.contains(a.position))
            .count() as u64
    }

    /// Non-duplicate, in-range reads on both strands.
    pub fn nonredundant_reads(&self) -> u64 {
        self.nonredundant_reads_on(Strand::Forward) + self.nonredundant_reads_on(Strand::Reverse)
    }
}
