#[cfg(test)]
mod tests {
    use dockpanel_bundler::bundler::PackageType;

    #[test]
    fn test_package_type_priority() {
        assert_eq!(PackageType::AppImage.priority(), 0);
        assert_eq!(PackageType::Portable.priority(), 0);
        assert_eq!(PackageType::WrappedAppImage.priority(), 1);
        assert!(PackageType::Portable.priority() < PackageType::WrappedAppImage.priority());
    }

    #[test]
    fn test_package_type_short_names() {
        assert_eq!(PackageType::AppImage.short_name(), "appimage");
        assert_eq!(PackageType::Portable.short_name(), "portable");
        assert_eq!(PackageType::WrappedAppImage.to_string(), "wrapped-appimage");
    }

    #[test]
    fn test_all_types() {
        let types = PackageType::all();
        assert_eq!(types.len(), 3);
        assert!(types.contains(&PackageType::WrappedAppImage));
    }
}
