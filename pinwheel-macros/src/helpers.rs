use proc_macro2::TokenStream;
use quote::quote;

/// Determines what crate name should be used to refer to `pinwheel`.
/// crate::... or pinwheel::... depending.
pub fn pinwheel_crate_path() -> TokenStream {
    crate_path_for(std::env::var("CARGO_CRATE_NAME").ok().as_deref())
}

fn crate_path_for(crate_name: Option<&str>) -> TokenStream {
    match crate_name == Some("pinwheel") {
        true => quote!(crate),
        false => quote!(pinwheel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinwheel_crate_path_internal() {
        assert_eq!(crate_path_for(Some("pinwheel")).to_string(), "crate");
    }

    #[test]
    fn test_pinwheel_crate_path_external() {
        assert_eq!(
            crate_path_for(Some("some_other_crate")).to_string(),
            "pinwheel"
        );
        assert_eq!(crate_path_for(Some("pinwheel_sweep")).to_string(), "pinwheel");
    }

    #[test]
    fn test_pinwheel_crate_path_no_env_var() {
        assert_eq!(crate_path_for(None).to_string(), "pinwheel");
    }
}
