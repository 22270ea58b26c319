use proc_macro::TokenStream;
use quote::quote;
use regex::Regex;
use std::path::Path;
use syn::{LitStr, parse_macro_input};
use walkdir::WalkDir;

const EXTENSION: &str = "sql";

/// Dot path of a template relative to the embedded root: `users/email.sql`
/// becomes `users.email`.
fn dot_path(root: &Path, path: &Path, segment: &Regex) -> Result<String, String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| format!("{:?} is outside of {:?}", path, root))?
        .with_extension("");
    let mut segments = Vec::new();
    for component in relative.components() {
        let name = component.as_os_str().to_string_lossy();
        if !segment.is_match(&name) {
            return Err(format!(
                "template {:?} has a path segment {:?} that cannot be part of a dot path",
                path, name
            ));
        }
        segments.push(name.into_owned());
    }
    Ok(segments.join("."))
}

fn expand(dir_lit: &LitStr) -> syn::Result<proc_macro2::TokenStream> {
    let fail = |message: String| syn::Error::new(dir_lit.span(), message);

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map_err(|_| fail("CARGO_MANIFEST_DIR not set".to_string()))?;
    let root_path = Path::new(&manifest_dir).join(dir_lit.value());

    if !root_path.is_dir() {
        return Err(fail(format!("Directory not found: {:?}", root_path)));
    }

    let segment = Regex::new(r"^[A-Za-z0-9_\-]+$").unwrap();
    let mut entries: Vec<proc_macro2::TokenStream> = Vec::new();

    for entry in WalkDir::new(&root_path).sort_by_file_name() {
        let entry = entry.map_err(|err| fail(err.to_string()))?;
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != EXTENSION) {
            continue;
        }
        let name = dot_path(&root_path, path, &segment).map_err(fail)?;
        // include_str! links the output to the template so that any change to
        // the file triggers a recompilation
        let path_str = path.to_string_lossy().into_owned();
        entries.push(quote! { (#name, include_str!(#path_str)) });
    }

    Ok(quote! {
        ::querylet::Embedded::new(&[#(#entries),*])
    })
}

/// Embeds every `.sql` file below a directory, relative to the calling
/// crate's manifest, as a `querylet::Embedded` template source.
///
/// ```ignore
/// static QUERIES: querylet::Embedded = querylet::directory!("queries");
/// let querylet = querylet::Querylet::new(QUERIES);
/// ```
#[proc_macro]
pub fn querylet_directory(input: TokenStream) -> TokenStream {
    let dir_lit = parse_macro_input!(input as LitStr);
    expand(&dir_lit)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
