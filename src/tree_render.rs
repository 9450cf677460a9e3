//! ASCII tree rendering for ancestries.

use crate::models::{AncestryNode, Person};

/// One line of the tree: full name and birthday.
fn label(person: &Person) -> String {
    format!("{} ({})", person.full_name(), person.birthday)
}

/// Render an ancestry as ASCII art, the person at the root and each
/// generation of parents one level deeper.
///
/// Example output:
/// ```text
/// Fynn Hirsch (2010-03-01)
/// ├── Ben Feuchtwanger (1980-07-12)
/// │   └── Silvio Hauer (1950-01-30)
/// └── Arne Hohenstein (1982-11-04)
/// ```
pub fn render_ancestry(root: &AncestryNode) -> String {
    let mut output = String::new();
    output.push_str(&label(&root.person));
    output.push('\n');
    render_ancestors(&mut output, &root.ancestors, "");
    output
}

fn render_ancestors(output: &mut String, nodes: &[AncestryNode], prefix: &str) {
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i == nodes.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
        output.push_str(&label(&node.person));
        output.push('\n');

        let continuation = if is_last { "    " } else { "│   " };
        render_ancestors(output, &node.ancestors, &format!("{}{}", prefix, continuation));
    }
}
