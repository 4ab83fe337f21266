// SQL query constants for repositories
// Keeps the SELECT/RETURNING column lists in one place

/// SQL query fragments for companies table
pub mod company_queries {
    pub const SELECT_ALL_COLUMNS: &str =
        "handle, name, description, num_employees, logo_url";
}

/// SQL query fragments for jobs table
pub mod job_queries {
    /// `equity` is NUMERIC in the database and read back as a float
    pub const SELECT_ALL_COLUMNS: &str =
        "id, title, salary, equity::float8 AS equity, company_handle";

    pub const SELECT_SUMMARY_COLUMNS: &str = "id, title, salary, equity::float8 AS equity";
}

/// SQL query fragments for users table
pub mod user_queries {
    /// Never includes the password hash
    pub const SELECT_ALL_COLUMNS: &str = "username, first_name, last_name, email, is_admin";
}
