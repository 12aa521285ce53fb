use handlebars::Handlebars;

/// Build the template registry. Templates are compiled into the binary and
/// registered once at startup.
pub fn build_templates() -> Result<Handlebars<'static>, handlebars::TemplateError> {
    let mut registry = Handlebars::new();
    registry.register_template_string("index", include_str!("../templates/index.hbs"))?;
    registry.register_template_string("post", include_str!("../templates/post.hbs"))?;
    registry.register_template_string("create", include_str!("../templates/create.hbs"))?;
    Ok(registry)
}
