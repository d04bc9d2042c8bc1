use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;

use crate::codegen::error::ArtifactError;
use crate::codegen::types::{Attribute, Entity, FieldType};
use crate::codegen::utils::{escape_dart_string, pluralize, to_title_case};

use super::ClientConfig;

fn label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(name|title|nombre|titulo)").expect("static regex is valid"))
}

/// Attribute shown as a list item's title: the first one resembling a name or
/// title, else the first attribute
pub fn primary_label_attribute(entity: &Entity) -> Option<&Attribute> {
    entity
        .attributes
        .iter()
        .find(|a| label_regex().is_match(&a.name))
        .or_else(|| entity.attributes.first())
}

/// Dart expression converting a text controller's value to the field type
fn parse_expr(controller: &str, field_type: FieldType) -> String {
    match field_type {
        FieldType::Integer | FieldType::Long => format!("int.tryParse({}.text.trim())", controller),
        FieldType::Decimal => format!("double.tryParse({}.text.trim())", controller),
        FieldType::Boolean => format!("{}.text.trim().toLowerCase() == 'true'", controller),
        FieldType::String | FieldType::Date | FieldType::DateTime => format!("{}.text", controller),
    }
}

/// Attributes shown as a list item's subtitle: the two that follow the primary
/// label in declaration order, wrapping to the start of the list when fewer
/// than two follow it
pub fn secondary_label_attributes(entity: &Entity) -> Vec<&Attribute> {
    let attributes = &entity.attributes;
    let Some(primary) = primary_label_attribute(entity) else {
        return Vec::new();
    };
    let start = attributes
        .iter()
        .position(|a| a.name == primary.name)
        .unwrap_or(0);
    attributes
        .iter()
        .cycle()
        .skip(start + 1)
        .take(attributes.len() - 1)
        .take(2)
        .collect()
}

/// Generate the CRUD page: list with pull-to-refresh, create/edit dialog,
/// delete confirmation. Rows are titled by [`primary_label_attribute`] with
/// [`secondary_label_attributes`] as subtitle.
pub fn generate_page_dart(entity: &Entity, config: &ClientConfig) -> Result<String, ArtifactError> {
    let mut out = String::new();
    let name = &entity.name;
    let label = escape_dart_string(&to_title_case(name));
    let plural_label = escape_dart_string(&to_title_case(&pluralize(name)));
    let mapping = config.type_mapping;

    let primary = primary_label_attribute(entity);
    let secondary = secondary_label_attributes(entity);

    // Form inputs: every attribute plus every owned foreign key
    let mut inputs: Vec<(String, String, FieldType)> = entity
        .attributes
        .iter()
        .map(|a| (a.name.clone(), to_title_case(&a.name), mapping.resolve(a)))
        .collect();
    for relation in entity.owned_foreign_keys() {
        let field = relation.id_field_name();
        let title = format!("{} ID", to_title_case(&relation.target));
        inputs.push((field, title, FieldType::Long));
    }

    writeln!(out, "import 'package:flutter/material.dart';")?;
    writeln!(out)?;
    writeln!(out, "import '../models/{}_model.dart';", entity.file_stem())?;
    writeln!(out, "import '../services/{}_service.dart';", entity.file_stem())?;
    writeln!(out)?;

    writeln!(out, "class {}Page extends StatefulWidget {{", name)?;
    writeln!(out, "  const {}Page({{super.key}});", name)?;
    writeln!(out)?;
    writeln!(out, "  @override")?;
    writeln!(out, "  State<{}Page> createState() => _{}PageState();", name, name)?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "class _{}PageState extends State<{}Page> {{", name, name)?;
    writeln!(out, "  final {}Service _service = {}Service();", name, name)?;
    writeln!(out, "  List<{}> _items = [];", name)?;
    writeln!(out, "  bool _loading = true;")?;
    writeln!(out, "  String? _error;")?;
    writeln!(out)?;
    writeln!(out, "  @override")?;
    writeln!(out, "  void initState() {{")?;
    writeln!(out, "    super.initState();")?;
    writeln!(out, "    _load();")?;
    writeln!(out, "  }}")?;
    writeln!(out)?;

    writeln!(out, "  Future<void> _load() async {{")?;
    writeln!(out, "    setState(() {{")?;
    writeln!(out, "      _loading = true;")?;
    writeln!(out, "      _error = null;")?;
    writeln!(out, "    }});")?;
    writeln!(out, "    try {{")?;
    writeln!(out, "      final items = await _service.getAll();")?;
    writeln!(out, "      if (!mounted) return;")?;
    writeln!(out, "      setState(() {{")?;
    writeln!(out, "        _items = items;")?;
    writeln!(out, "        _loading = false;")?;
    writeln!(out, "      }});")?;
    writeln!(out, "    }} catch (e) {{")?;
    writeln!(out, "      if (!mounted) return;")?;
    writeln!(out, "      setState(() {{")?;
    writeln!(out, "        _error = e.toString();")?;
    writeln!(out, "        _loading = false;")?;
    writeln!(out, "      }});")?;
    writeln!(out, "    }}")?;
    writeln!(out, "  }}")?;
    writeln!(out)?;

    writeln!(out, "  void _showError(Object error) {{")?;
    writeln!(out, "    ScaffoldMessenger.of(context).showSnackBar(")?;
    writeln!(out, "      SnackBar(content: Text(error.toString())),")?;
    writeln!(out, "    );")?;
    writeln!(out, "  }}")?;
    writeln!(out)?;

    // Create/edit dialog
    writeln!(out, "  Future<void> _openForm([{}? item]) async {{", name)?;
    for (field, _, _) in &inputs {
        writeln!(
            out,
            "    final {}Controller = TextEditingController(text: item?.{}?.toString() ?? '');",
            field, field
        )?;
    }
    writeln!(out, "    final saved = await showDialog<bool>(")?;
    writeln!(out, "      context: context,")?;
    writeln!(out, "      builder: (context) => AlertDialog(")?;
    writeln!(
        out,
        "        title: Text(item == null ? 'New {}' : 'Edit {}'),",
        label, label
    )?;
    writeln!(out, "        content: SingleChildScrollView(")?;
    writeln!(out, "          child: Column(")?;
    writeln!(out, "            mainAxisSize: MainAxisSize.min,")?;
    writeln!(out, "            children: [")?;
    for (field, title, field_type) in &inputs {
        writeln!(out, "              TextField(")?;
        writeln!(out, "                controller: {}Controller,", field)?;
        writeln!(
            out,
            "                decoration: const InputDecoration(labelText: '{}'),",
            escape_dart_string(title)
        )?;
        if matches!(
            field_type,
            FieldType::Integer | FieldType::Long | FieldType::Decimal
        ) {
            writeln!(out, "                keyboardType: TextInputType.number,")?;
        }
        writeln!(out, "              ),")?;
    }
    writeln!(out, "            ],")?;
    writeln!(out, "          ),")?;
    writeln!(out, "        ),")?;
    writeln!(out, "        actions: [")?;
    writeln!(out, "          TextButton(")?;
    writeln!(out, "            onPressed: () => Navigator.pop(context, false),")?;
    writeln!(out, "            child: const Text('Cancel'),")?;
    writeln!(out, "          ),")?;
    writeln!(out, "          ElevatedButton(")?;
    writeln!(out, "            onPressed: () => Navigator.pop(context, true),")?;
    writeln!(out, "            child: const Text('Save'),")?;
    writeln!(out, "          ),")?;
    writeln!(out, "        ],")?;
    writeln!(out, "      ),")?;
    writeln!(out, "    );")?;
    writeln!(out, "    if (saved != true) return;")?;
    writeln!(out)?;
    writeln!(out, "    final draft = {}(", name)?;
    writeln!(out, "      id: item?.id,")?;
    for (field, _, field_type) in &inputs {
        let controller = format!("{}Controller", field);
        writeln!(out, "      {}: {},", field, parse_expr(&controller, *field_type))?;
    }
    writeln!(out, "    );")?;
    writeln!(out, "    try {{")?;
    writeln!(out, "      final id = item?.id;")?;
    writeln!(out, "      if (id == null) {{")?;
    writeln!(out, "        await _service.create(draft);")?;
    writeln!(out, "      }} else {{")?;
    writeln!(out, "        await _service.update(id, draft);")?;
    writeln!(out, "      }}")?;
    writeln!(out, "      await _load();")?;
    writeln!(out, "    }} catch (e) {{")?;
    writeln!(out, "      _showError(e);")?;
    writeln!(out, "    }}")?;
    writeln!(out, "  }}")?;
    writeln!(out)?;

    // Delete confirmation
    writeln!(out, "  Future<void> _confirmDelete({} item) async {{", name)?;
    writeln!(out, "    final id = item.id;")?;
    writeln!(out, "    if (id == null) return;")?;
    writeln!(out, "    final confirmed = await showDialog<bool>(")?;
    writeln!(out, "      context: context,")?;
    writeln!(out, "      builder: (context) => AlertDialog(")?;
    writeln!(out, "        title: const Text('Delete {}'),", label)?;
    writeln!(
        out,
        "        content: Text('Delete {} #$id? This cannot be undone.'),",
        label
    )?;
    writeln!(out, "        actions: [")?;
    writeln!(out, "          TextButton(")?;
    writeln!(out, "            onPressed: () => Navigator.pop(context, false),")?;
    writeln!(out, "            child: const Text('Cancel'),")?;
    writeln!(out, "          ),")?;
    writeln!(out, "          TextButton(")?;
    writeln!(out, "            onPressed: () => Navigator.pop(context, true),")?;
    writeln!(out, "            child: const Text('Delete'),")?;
    writeln!(out, "          ),")?;
    writeln!(out, "        ],")?;
    writeln!(out, "      ),")?;
    writeln!(out, "    );")?;
    writeln!(out, "    if (confirmed != true) return;")?;
    writeln!(out, "    try {{")?;
    writeln!(out, "      await _service.delete(id);")?;
    writeln!(out, "      await _load();")?;
    writeln!(out, "    }} catch (e) {{")?;
    writeln!(out, "      _showError(e);")?;
    writeln!(out, "    }}")?;
    writeln!(out, "  }}")?;
    writeln!(out)?;

    // List tile labels
    writeln!(out, "  String _title({} item) {{", name)?;
    match primary {
        Some(attr) => writeln!(
            out,
            "    return item.{}?.toString() ?? '{} #${{item.id}}';",
            attr.name, label
        )?,
        None => writeln!(out, "    return '{} #${{item.id}}';", label)?,
    }
    writeln!(out, "  }}")?;
    writeln!(out)?;
    writeln!(out, "  String _subtitle({} item) {{", name)?;
    if secondary.is_empty() {
        writeln!(out, "    return '';")?;
    } else {
        let values: Vec<String> = secondary.iter().map(|a| format!("item.{}", a.name)).collect();
        writeln!(out, "    return [{}]", values.join(", "))?;
        writeln!(out, "        .where((value) => value != null)")?;
        writeln!(out, "        .map((value) => value.toString())")?;
        writeln!(out, "        .join(' - ');")?;
    }
    writeln!(out, "  }}")?;
    writeln!(out)?;

    // build
    writeln!(out, "  @override")?;
    writeln!(out, "  Widget build(BuildContext context) {{")?;
    writeln!(out, "    return Scaffold(")?;
    writeln!(out, "      appBar: AppBar(title: const Text('{}')),", plural_label)?;
    writeln!(out, "      body: _buildBody(),")?;
    writeln!(out, "      floatingActionButton: FloatingActionButton(")?;
    writeln!(out, "        onPressed: () => _openForm(),")?;
    writeln!(out, "        child: const Icon(Icons.add),")?;
    writeln!(out, "      ),")?;
    writeln!(out, "    );")?;
    writeln!(out, "  }}")?;
    writeln!(out)?;
    writeln!(out, "  Widget _buildBody() {{")?;
    writeln!(out, "    if (_loading) {{")?;
    writeln!(out, "      return const Center(child: CircularProgressIndicator());")?;
    writeln!(out, "    }}")?;
    writeln!(out, "    if (_error != null) {{")?;
    writeln!(out, "      return Center(child: Text(_error!));")?;
    writeln!(out, "    }}")?;
    writeln!(out, "    return RefreshIndicator(")?;
    writeln!(out, "      onRefresh: _load,")?;
    writeln!(out, "      child: _items.isEmpty")?;
    writeln!(out, "          ? ListView(")?;
    writeln!(out, "              children: const [")?;
    writeln!(
        out,
        "                Center(child: Padding(padding: EdgeInsets.all(24), child: Text('No {} yet'))),",
        plural_label.to_lowercase()
    )?;
    writeln!(out, "              ],")?;
    writeln!(out, "            )")?;
    writeln!(out, "          : ListView.builder(")?;
    writeln!(out, "              itemCount: _items.length,")?;
    writeln!(out, "              itemBuilder: (context, index) {{")?;
    writeln!(out, "                final item = _items[index];")?;
    writeln!(out, "                return ListTile(")?;
    writeln!(out, "                  title: Text(_title(item)),")?;
    writeln!(out, "                  subtitle: Text(_subtitle(item)),")?;
    writeln!(out, "                  onTap: () => _openForm(item),")?;
    writeln!(out, "                  trailing: IconButton(")?;
    writeln!(out, "                    icon: const Icon(Icons.delete),")?;
    writeln!(out, "                    onPressed: () => _confirmDelete(item),")?;
    writeln!(out, "                  ),")?;
    writeln!(out, "                );")?;
    writeln!(out, "              }},")?;
    writeln!(out, "            ),")?;
    writeln!(out, "    );")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::types::{NodeKind, RelationDescriptor};

    #[test]
    fn test_primary_label_prefers_name_like_attributes() {
        let entity = Entity::new(1, "Book", NodeKind::Standard)
            .with_attribute("isbn", "String")
            .with_attribute("bookTitle", "String")
            .with_attribute("pages", "int");
        assert_eq!(primary_label_attribute(&entity).unwrap().name, "bookTitle");

        let plain = Entity::new(2, "Reading", NodeKind::Standard).with_attribute("value", "double");
        assert_eq!(primary_label_attribute(&plain).unwrap().name, "value");
    }

    #[test]
    fn test_secondary_labels_follow_the_primary() {
        let names = |entity: &Entity| -> Vec<String> {
            secondary_label_attributes(entity).iter().map(|a| a.name.clone()).collect()
        };

        let book = Entity::new(1, "Book", NodeKind::Standard)
            .with_attribute("isbn", "String")
            .with_attribute("title", "String")
            .with_attribute("author", "String")
            .with_attribute("year", "int");
        assert_eq!(names(&book), vec!["author", "year"]);

        // Primary near the end: wrap to the first attributes
        let product = Entity::new(2, "Product", NodeKind::Standard)
            .with_attribute("price", "double")
            .with_attribute("stock", "int")
            .with_attribute("name", "String");
        assert_eq!(names(&product), vec!["price", "stock"]);

        let pair = Entity::new(3, "Pair", NodeKind::Standard)
            .with_attribute("left", "String")
            .with_attribute("title", "String");
        assert_eq!(names(&pair), vec!["left"]);

        let single = Entity::new(4, "Reading", NodeKind::Standard).with_attribute("value", "double");
        assert!(names(&single).is_empty());
        assert!(names(&Entity::new(5, "Tag", NodeKind::Standard)).is_empty());
    }

    #[test]
    fn test_page_labels() {
        let entity = Entity::new(1, "Book", NodeKind::Standard)
            .with_attribute("isbn", "String")
            .with_attribute("title", "String")
            .with_attribute("pages", "int")
            .with_attribute("year", "int");
        let dart = generate_page_dart(&entity, &ClientConfig::default()).unwrap();

        assert!(dart.contains("return item.title?.toString() ?? 'Book #${item.id}';"));
        assert!(dart.contains("return [item.pages, item.year]"));
        assert!(!dart.contains("item.isbn]"));
        assert!(dart.contains("class BookPage extends StatefulWidget {"));
        assert!(dart.contains("RefreshIndicator("));
        assert!(dart.contains("title: const Text('Delete Book'),"));
    }

    #[test]
    fn test_page_without_attributes() {
        let entity = Entity::new(1, "Tag", NodeKind::Standard);
        let dart = generate_page_dart(&entity, &ClientConfig::default()).unwrap();

        assert!(dart.contains("return 'Tag #${item.id}';"));
        assert!(dart.contains("return '';"));
    }

    #[test]
    fn test_form_includes_foreign_keys() {
        let mut order = Entity::new(1, "Order", NodeKind::Standard).with_attribute("total", "String");
        order.relations.push(RelationDescriptor::many_to_one("Customer"));
        let dart = generate_page_dart(&order, &ClientConfig::default()).unwrap();

        assert!(dart.contains("final customerIdController = TextEditingController("));
        assert!(dart.contains("labelText: 'Customer ID'"));
        assert!(dart.contains("customerId: int.tryParse(customerIdController.text.trim()),"));
        assert!(dart.contains("total: totalController.text,"));
    }
}
