#![warn(missing_docs)]
//! Module handling the export of an [`OpticalNetwork`](crate::network::OpticalNetwork) into the
//! Graphviz `.dot` format.

/// This trait deals with the translation of a component into a node of a dot-file which is
/// needed to visualize the connection graph.
pub trait Dottable {
    /// Return the dot statement of a single component node.
    ///
    /// The node is drawn as a table with one cell per port so that connections can be attached
    /// to the individual ports (`A`..`D`).
    fn to_dot(&self, node_index: usize, name: &str, ports: &[&str]) -> String {
        let mut dot_str = format!("\ti{node_index} [\n\t\tshape=plaintext\n");
        dot_str.push_str(&format!(
            concat!(
                "\t\tlabel=<\n",
                "\t\t\t<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\" BGCOLOR=\"{}\">\n"
            ),
            self.node_color()
        ));
        dot_str.push_str(&format!(
            "\t\t\t\t<TR><TD COLSPAN=\"{}\">{}</TD></TR>\n",
            ports.len().max(1),
            escape_html(name)
        ));
        if !ports.is_empty() {
            dot_str.push_str("\t\t\t\t<TR>");
            for port in ports {
                dot_str.push_str(&self.create_port_cell_str(port));
            }
            dot_str.push_str("</TR>\n");
        }
        dot_str.push_str("\t\t\t</TABLE>\n\t\t>\n\t]\n");
        dot_str
    }
    /// Create the dot-string of a single port cell.
    fn create_port_cell_str(&self, port_name: &str) -> String {
        format!("<TD PORT=\"{port_name}\" BGCOLOR=\"lightblue\">{port_name}</TD>")
    }
    /// Defines the displayed color of the node
    ///
    /// # Returns
    /// Returns the color string of the node.
    fn node_color(&self) -> &'static str {
        "lightgray"
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
