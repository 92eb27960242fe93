use std::collections::BTreeMap;

use strandshift_core::models::ChromosomeReads;

use crate::config::ShiftConfig;
use crate::fragvar::FragmentVariabilityAtlas;
use crate::scanner::ScanResult;

pub const GENOME_PROFILE_NAME: &str = "genome";

///
/// Offset to value maps of one chromosome, or of the whole genome.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftProfile {
    pub name: String,
    pub start: i64,
    pub end: i64,
    pub width: i64,
    /// Non-duplicate reads on both strands.
    pub nread: u64,
    pub mappable_length: u64,
    /// Share of the genome's reads; 1 for the genome profile.
    pub weight: f64,
    pub fine: BTreeMap<i32, f64>,
    pub background: BTreeMap<i32, f64>,
    pub degenerate: bool,
}

impl ShiftProfile {
    pub fn new<S: Into<String>>(name: S, length: u64, nread: u64, mappable_length: u64) -> Self {
        ShiftProfile {
            name: name.into(),
            start: 0,
            end: length as i64,
            width: length as i64,
            nread,
            mappable_length,
            weight: 1.0,
            fine: BTreeMap::new(),
            background: BTreeMap::new(),
            degenerate: false,
        }
    }

    /// An empty profile shaped after a chromosome.
    pub fn from_reads(reads: &ChromosomeReads) -> Self {
        ShiftProfile::new(
            reads.name.clone(),
            reads.length,
            reads.nonredundant_reads(),
            reads.mappable_length,
        )
    }

    /// Set every offset of both domains to 0.
    pub fn fill_zero(&mut self, config: &ShiftConfig) {
        self.fine = config.fine_offsets().map(|i| (i, 0.0)).collect();
        self.background = config.background_offsets().map(|i| (i, 0.0)).collect();
    }

    ///
    /// Mark the profile as unusable: all values 0 and no weight in the
    /// genome.
    ///
    pub fn mark_degenerate(&mut self, config: &ShiftConfig) {
        self.fill_zero(config);
        self.degenerate = true;
        self.weight = 0.0;
    }

    pub fn set_scan(&mut self, scan: ScanResult) {
        self.fine = scan.fine;
        self.background = scan.background;
    }

    /// `weight = nread / genome_nread`, 0 for degenerate profiles or an empty genome.
    pub fn set_weight(&mut self, genome_nread: u64) {
        self.weight = if self.degenerate || genome_nread == 0 {
            0.0
        } else {
            self.nread as f64 / genome_nread as f64
        };
    }

    ///
    /// Add `other`'s values, multiplied by `other.weight`, into this profile.
    ///
    pub fn add_weighted(&mut self, other: &ShiftProfile) {
        for (offset, value) in other.fine.iter() {
            *self.fine.entry(*offset).or_insert(0.0) += value * other.weight;
        }
        for (offset, value) in other.background.iter() {
            *self.background.entry(*offset).or_insert(0.0) += value * other.weight;
        }
    }

    /// Value at a fine offset; 0 when the offset is missing.
    pub fn value(&self, offset: i32) -> f64 {
        self.fine.get(&offset).copied().unwrap_or(0.0)
    }

    /// Sum of all fine values.
    pub fn sum(&self) -> f64 {
        self.fine.values().sum()
    }
}

///
/// The genome profile together with the chromosome profiles it was built from.
///
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeProfile {
    pub profile: ShiftProfile,
    pub chromosomes: Vec<ShiftProfile>,
    /// Whether `chromosomes[i]` contributes to `profile`.
    pub included: Vec<bool>,
    pub fragment_variability: Option<FragmentVariabilityAtlas>,
}

impl GenomeProfile {
    ///
    /// Weight every chromosome by its share of all reads and sum the included
    /// ones into the genome profile.
    ///
    /// The read total runs over every chromosome, included or not, so the
    /// weights of the included chromosomes need not add up to 1.
    ///
    pub fn from_chromosomes<F>(mut chromosomes: Vec<ShiftProfile>, config: &ShiftConfig, is_included: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let total: u64 = chromosomes.iter().map(|c| c.nread).sum();
        for chrom in chromosomes.iter_mut() {
            chrom.set_weight(total);
        }

        let included: Vec<bool> = chromosomes.iter().map(|c| is_included(&c.name)).collect();

        let mut profile = ShiftProfile::new(GENOME_PROFILE_NAME, 0, 0, 0);
        profile.fill_zero(config);

        for (chrom, _) in chromosomes.iter().zip(included.iter()).filter(|(_, inc)| **inc) {
            profile.nread += chrom.nread;
            profile.mappable_length += chrom.mappable_length;
            profile.end += chrom.width;
            profile.add_weighted(chrom);
        }
        profile.width = profile.end - profile.start;

        GenomeProfile {
            profile,
            chromosomes,
            included,
            fragment_variability: None,
        }
    }

    pub fn with_fragment_variability(mut self, atlas: FragmentVariabilityAtlas) -> Self {
        self.fragment_variability = Some(atlas);
        self
    }

    pub fn chromosome(&self, name: &str) -> Option<&ShiftProfile> {
        self.chromosomes.iter().find(|c| c.name == name)
    }

    pub fn included_chromosomes(&self) -> impl Iterator<Item = &ShiftProfile> {
        self.chromosomes
            .iter()
            .zip(self.included.iter())
            .filter(|(_, inc)| **inc)
            .map(|(c, _)| c)
    }
}
