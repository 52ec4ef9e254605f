//! Configuration for the diversion engine.
//!
//! `DiversionColumns` maps the engine onto the caller's column names and
//! `DiversionConfig` carries the behavioural switches. Both come with
//! defaults that match the standard discharge extract layout.

/// Column names the engine reads from a discharge batch
#[derive(Debug, Clone)]
pub struct DiversionColumns {
    /// Cell (micro-market) identifier column
    pub cell: String,
    /// Hospital identifier column
    pub hosp_id: String,
    /// Hospital display-name column
    pub hospital: String,
    /// System identifier column
    pub sys_id: String,
    /// Merging-party indicator column
    pub party_ind: String,
    /// Admission count column
    pub count: String,
}

impl Default for DiversionColumns {
    fn default() -> Self {
        Self {
            cell: "cell".to_string(),
            hosp_id: "hosp_id".to_string(),
            hospital: "hospital".to_string(),
            sys_id: "sys_id".to_string(),
            party_ind: "party_ind".to_string(),
            count: "count".to_string(),
        }
    }
}

impl DiversionColumns {
    /// Create a new instance with the default column names
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All required column names, in schema order
    #[must_use]
    pub fn required(&self) -> [&str; 6] {
        [
            &self.cell,
            &self.hosp_id,
            &self.hospital,
            &self.sys_id,
            &self.party_ind,
            &self.count,
        ]
    }
}

/// Configuration for a diversion-ratio computation
#[derive(Debug, Clone)]
pub struct DiversionConfig {
    /// The column names to read from the input batch
    pub columns: DiversionColumns,

    /// Whether cells fully captured by the focal system are dropped from
    /// the diversion denominator (`true`) or kept so that the excluded
    /// admissions they hold dilute every ratio (`false`)
    pub drop_degenerate_cells: bool,

    /// Whether to use parallel processing across exclusion scenarios
    pub use_parallel: bool,

    /// Whether to render a progress bar while scenarios run
    pub show_progress: bool,
}

impl Default for DiversionConfig {
    fn default() -> Self {
        Self {
            columns: DiversionColumns::default(),
            drop_degenerate_cells: true, // Renormalize away fully-captured cells
            use_parallel: true,          // Parallelize large scenario sets
            show_progress: false,        // Quiet by default; opt in for long runs
        }
    }
}

impl DiversionConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for constructing a configuration
    #[must_use]
    pub fn builder() -> DiversionConfigBuilder {
        DiversionConfigBuilder::new()
    }
}

/// Builder for constructing a diversion configuration
#[derive(Debug, Clone)]
pub struct DiversionConfigBuilder {
    config: DiversionConfig,
}

impl Default for DiversionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DiversionConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: DiversionConfig::default(),
        }
    }

    /// Set all column names at once
    #[must_use]
    pub fn columns(mut self, columns: DiversionColumns) -> Self {
        self.config.columns = columns;
        self
    }

    /// Set the cell identifier column
    #[must_use]
    pub fn cell_column(mut self, name: &str) -> Self {
        self.config.columns.cell = name.to_string();
        self
    }

    /// Set the hospital identifier column
    #[must_use]
    pub fn hosp_id_column(mut self, name: &str) -> Self {
        self.config.columns.hosp_id = name.to_string();
        self
    }

    /// Set the hospital name column
    #[must_use]
    pub fn hospital_column(mut self, name: &str) -> Self {
        self.config.columns.hospital = name.to_string();
        self
    }

    /// Set the system identifier column
    #[must_use]
    pub fn sys_id_column(mut self, name: &str) -> Self {
        self.config.columns.sys_id = name.to_string();
        self
    }

    /// Set the merging-party indicator column
    #[must_use]
    pub fn party_ind_column(mut self, name: &str) -> Self {
        self.config.columns.party_ind = name.to_string();
        self
    }

    /// Set the admission count column
    #[must_use]
    pub fn count_column(mut self, name: &str) -> Self {
        self.config.columns.count = name.to_string();
        self
    }

    /// Set whether fully-captured cells are dropped from the denominator
    #[must_use]
    pub const fn drop_degenerate_cells(mut self, drop: bool) -> Self {
        self.config.drop_degenerate_cells = drop;
        self
    }

    /// Set whether to use parallel processing
    #[must_use]
    pub const fn use_parallel(mut self, parallel: bool) -> Self {
        self.config.use_parallel = parallel;
        self
    }

    /// Set whether to render a progress bar
    #[must_use]
    pub const fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    /// Build the diversion configuration
    #[must_use]
    pub fn build(self) -> DiversionConfig {
        self.config
    }
}
