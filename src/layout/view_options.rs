use plist::{Dictionary, Value};

use super::config::IconViewOptions;

/// Build the `icvp` property list.
pub(crate) fn icon_view_plist(options: &IconViewOptions, background_alias: Vec<u8>) -> Value {
    let mut dict = Dictionary::new();
    let mut put = |key: &str, value: Value| {
        dict.insert(key.to_string(), value);
    };

    put("viewOptionsVersion", Value::Integer(options.view_options_version.into()));
    put("gridOffsetX", Value::Integer(options.grid_offset_x.into()));
    put("gridOffsetY", Value::Integer(options.grid_offset_y.into()));
    put("gridSpacing", Value::Integer(options.grid_spacing.into()));
    put("iconSize", Value::Integer(options.icon_size.into()));
    put("textSize", Value::Integer(options.text_size.into()));
    put("showIconPreview", Value::Boolean(options.show_icon_preview));
    put("showItemInfo", Value::Boolean(options.show_item_info));
    put("labelOnBottom", Value::Boolean(options.label_on_bottom));
    put("scrollPositionX", Value::Integer(options.scroll_position_x.into()));
    put("scrollPositionY", Value::Integer(options.scroll_position_y.into()));
    put("arrangeBy", Value::String(options.arrange_by.clone()));
    put("backgroundColorRed", Value::Real(options.background_color.red));
    put("backgroundColorGreen", Value::Real(options.background_color.green));
    put("backgroundColorBlue", Value::Real(options.background_color.blue));
    put("backgroundType", Value::Integer(options.background_type.into()));
    put("backgroundImageAlias", Value::Data(background_alias));

    Value::Dictionary(dict)
}
